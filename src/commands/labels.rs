use crate::args::LabelsArgs;
use crate::commands::Out;
use crate::labels::{compose, Heading, LabelDocument};
use crate::model::Table;
use crate::{files, utils, Config, Result};

/// Prints the label table at `args.table()` as a PDF. The championship and stage are upper-cased
/// before they are printed.
pub async fn labels(config: &Config, args: &LabelsArgs) -> Result<Out<LabelDocument>> {
    let table = Table::from_header_row(&files::read_table(args.table()).await?);
    let logo = utils::read_bytes(args.logo()).await?;
    let championship = args.championship().trim().to_uppercase();
    let stage = args.stage().trim().to_uppercase();

    let doc = compose(
        &table,
        &logo,
        Heading {
            championship: &championship,
            stage: &stage,
        },
        config.label_layout(),
    )?;

    let output = args.output();
    utils::write(&output, &doc.bytes).await?;
    Ok(Out::new(
        format!(
            "Wrote {} labels on {} pages to {}",
            doc.labels,
            doc.pages,
            output.display()
        ),
        doc,
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{png_logo, TestEnv};

    #[tokio::test]
    async fn test_labels_command() {
        let env = TestEnv::new().await;
        let mut csv = String::from("\u{feff}NOME ESCOLA,ANO ESCOLAR,TOTAL\n");
        for i in 0..11 {
            csv.push_str(&format!("ESCOLA {i},1º ANO,{i}\n"));
        }
        let table = env.file("standard-labels.csv", csv).await;
        let logo = env.file("logo.png", png_logo(30, 8)).await;
        let args = LabelsArgs::new(&table, &logo, "olimpíada", "fase 1", None);

        let out = labels(&env.config(), &args).await.unwrap();

        let doc = out.structure().unwrap();
        assert_eq!(doc.pages, 2);
        assert_eq!(doc.labels, 11);
        let pdf = tokio::fs::read(env.dir().join("standard-labels.pdf"))
            .await
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_labels_command_reports_bad_rows() {
        let env = TestEnv::new().await;
        let table = env
            .file("t.csv", "NOME ESCOLA,ANO ESCOLAR,TOTAL\nARARA,1º ANO,\n")
            .await;
        let logo = env.file("logo.png", png_logo(4, 4)).await;
        let output = env.dir().join("never.pdf");
        let args = LabelsArgs::new(&table, &logo, "c", "s", Some(output.clone()));
        assert!(labels(&env.config(), &args).await.is_err());
        assert!(!output.exists());
    }
}
