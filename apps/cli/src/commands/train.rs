//! Training command implementation.

use crate::config::TrainSettings;
use anyhow::{Context, Result};
use qtype_core::EmbeddingClassifier;
use qtype_training::{
    AnnotationReader, Classifier, Evaluator, Metrics, ModelLayout, RunId, Training, TrainingManifest,
};
use tabled::{Table, Tabled, settings::Style};

/// Read, train, score and save; prints the metrics table on success.
pub fn execute(settings: &TrainSettings) -> Result<()> {
    let classifier = EmbeddingClassifier::load(&settings.glove, settings.dimensions, settings.labels.clone())
        .with_context(|| format!("Failed to load embedding vectors from {}", settings.glove.display()))?
        .with_hyperparams(settings.hyperparams.clone())?;

    let reader = AnnotationReader::new(settings.labels.clone());
    let mut trainer = Training::with_reader(&settings.dataset, classifier, reader)
        .with_context(|| format!("Failed to read dataset {}", settings.dataset.display()))?;

    trainer.train().context("Training failed")?;

    let evaluator = Evaluator::new(settings.labels.clone());
    let metrics = trainer.training_error(&evaluator).context("Failed to compute training error")?;

    println!();
    println!("{}", render_metrics(&metrics));

    let model = trainer.model()?;
    let artifacts = trainer
        .save(model, &settings.output)
        .with_context(|| format!("Failed to save model to {}", settings.output.display()))?;

    let layout = ModelLayout::new(&settings.output);
    let manifest = TrainingManifest {
        run_id: RunId::new(),
        created_at: chrono::Utc::now(),
        classifier: trainer.classifier().id().to_string(),
        dataset_id: trainer.dataset().id()?,
        examples: trainer.dataset().len(),
        metrics,
        artifacts,
    };
    manifest.write(&layout.manifest_path()).context("Failed to write training manifest")?;

    tracing::info!(run_id = %manifest.run_id, output = %settings.output.display(), "Training run complete");
    Ok(())
}

#[derive(Tabled)]
struct MetricsRow {
    #[tabled(rename = "Precision", display_with = "three_places")]
    precision: f64,
    #[tabled(rename = "Recall", display_with = "three_places")]
    recall: f64,
    #[tabled(rename = "F1-Score", display_with = "three_places")]
    f1_score: f64,
}

fn three_places(value: &f64) -> String {
    format!("{value:.3}")
}

/// Pipe-delimited header plus one row, three decimals per value.
pub fn render_metrics(metrics: &Metrics) -> String {
    let row = MetricsRow { precision: metrics.precision, recall: metrics.recall, f1_score: metrics.f1_score };
    Table::new([row]).with(Style::markdown()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metrics_markdown_table() {
        let table = render_metrics(&Metrics { precision: 5.0 / 6.0, recall: 0.5, f1_score: 7.0 / 9.0 });
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "| Precision | Recall | F1-Score |");
        assert!(lines[1].starts_with("|--"));
        assert!(lines[2].contains("0.833"));
        assert!(lines[2].contains("0.500"));
        assert!(lines[2].contains("0.778"));
    }
}
