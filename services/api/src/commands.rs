use std::path::PathBuf;
use std::sync::Arc;

use cardio_risk::assessment::{
    score_csv_path, AssessmentController, DisplayState, FormFields, HeuristicScorer,
    RemotePredictorClient, RenderedAssessment, ReportExporter, ValidatedInput,
};
use cardio_risk::config::AppConfig;
use cardio_risk::error::AppError;
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Age in years
    #[arg(long)]
    pub(crate) age: String,
    /// male/female (or m/f, 1/2)
    #[arg(long)]
    pub(crate) sex: String,
    /// Body mass index
    #[arg(long)]
    pub(crate) bmi: String,
    /// Current smoker (yes/no)
    #[arg(long)]
    pub(crate) smoking: String,
    /// Diabetic (yes/no)
    #[arg(long)]
    pub(crate) diabetic: String,
    /// Regular alcohol use (yes/no)
    #[arg(long)]
    pub(crate) alcohol: Option<String>,
    /// History of stroke (yes/no)
    #[arg(long)]
    pub(crate) stroke: Option<String>,
    /// Regular physical activity (yes/no)
    #[arg(long)]
    pub(crate) physical: Option<String>,
    /// Average hours of sleep per night
    #[arg(long)]
    pub(crate) sleep: Option<String>,
    /// Self-rated general health, 1 (poor) to 5 (excellent)
    #[arg(long)]
    pub(crate) genhealth: Option<String>,
    /// Write the downloadable report to this path
    #[arg(long)]
    pub(crate) report: Option<PathBuf>,
}

impl AssessArgs {
    fn form(&self) -> FormFields {
        let mut fields = FormFields::new()
            .with("age", self.age.as_str())
            .with("sex", self.sex.as_str())
            .with("bmi", self.bmi.as_str())
            .with("smoking", self.smoking.as_str())
            .with("diabetic", self.diabetic.as_str());
        let optional = [
            ("alcohol", &self.alcohol),
            ("stroke", &self.stroke),
            ("physical", &self.physical),
            ("sleep", &self.sleep),
            ("genhealth", &self.genhealth),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.insert(name, value.as_str());
            }
        }
        fields
    }
}

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Age in days
    #[arg(long)]
    pub(crate) age: String,
    /// Height in centimetres
    #[arg(long)]
    pub(crate) height: String,
    /// Weight in kilograms
    #[arg(long)]
    pub(crate) weight: String,
    /// 1 (male) or 2 (female)
    #[arg(long)]
    pub(crate) gender: String,
    /// Systolic blood pressure
    #[arg(long = "ap-hi")]
    pub(crate) ap_hi: String,
    /// Diastolic blood pressure
    #[arg(long = "ap-lo")]
    pub(crate) ap_lo: String,
    /// Cholesterol level: 1 normal, 2 above normal, 3 well above normal
    #[arg(long)]
    pub(crate) cholesterol: String,
    /// Glucose level: 1 normal, 2 above normal, 3 well above normal
    #[arg(long)]
    pub(crate) gluc: String,
    /// Smoker (yes/no)
    #[arg(long)]
    pub(crate) smoke: String,
    /// Alcohol intake (yes/no)
    #[arg(long)]
    pub(crate) alco: String,
    /// Physically active (yes/no)
    #[arg(long)]
    pub(crate) active: String,
    /// Override the configured prediction endpoint
    #[arg(long)]
    pub(crate) endpoint: Option<String>,
    /// Write the downloadable report to this path
    #[arg(long)]
    pub(crate) report: Option<PathBuf>,
}

impl PredictArgs {
    fn form(&self) -> FormFields {
        [
            ("age", &self.age),
            ("height", &self.height),
            ("weight", &self.weight),
            ("gender", &self.gender),
            ("ap_hi", &self.ap_hi),
            ("ap_lo", &self.ap_lo),
            ("cholesterol", &self.cholesterol),
            ("gluc", &self.gluc),
            ("smoke", &self.smoke),
            ("alco", &self.alco),
            ("active", &self.active),
        ]
        .into_iter()
        .map(|(name, value)| (name, value.as_str()))
        .collect()
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one lifestyle survey per row; headers are form field names
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let scorer = HeuristicScorer::new();
    let controller = AssessmentController::new(Arc::new(scorer));
    let receipt = controller.submit(&args.form()).await?;

    println!("Lifestyle risk assessment");
    render_display(&receipt.display);

    if let Some(rendered) = controller.exportable() {
        if let ValidatedInput::Lifestyle(survey) = &rendered.input {
            let breakdown = scorer.evaluate(survey);
            println!("\nScore breakdown ({} raw points)", breakdown.raw_points);
            for component in &breakdown.components {
                println!("  +{:>2}  {}", component.points, component.note);
            }
        }
        if let Some(path) = args.report {
            write_report(&rendered, path).await?;
        }
    }

    Ok(())
}

pub(crate) async fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(endpoint) = args.endpoint.clone() {
        config.predictor.endpoint = endpoint;
    }

    let client = RemotePredictorClient::from_config(&config.predictor)?;
    let controller = AssessmentController::new(Arc::new(client));
    let receipt = controller.submit(&args.form()).await?;

    println!("Clinical risk prediction ({})", config.predictor.endpoint);
    render_display(&receipt.display);

    if let (Some(rendered), Some(path)) = (controller.exportable(), args.report) {
        write_report(&rendered, path).await?;
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let rows = score_csv_path(&args.csv)?;

    println!("Batch scoring: {}", args.csv.display());
    let mut scored = 0usize;
    for row in &rows {
        match &row.outcome {
            Ok(assessment) => {
                scored += 1;
                println!(
                    "- line {}: {:.0} ({})",
                    row.line,
                    assessment.result.score(),
                    assessment.result.category().label()
                );
            }
            Err(err) => println!("- line {}: rejected, {}", row.line, err),
        }
    }
    println!("{scored} of {} rows scored", rows.len());

    Ok(())
}

fn render_display(display: &DisplayState) {
    match display {
        DisplayState::Ready {
            score,
            category,
            message,
            ..
        } => {
            println!("- Risk percentage: {score:.2}%");
            println!("- Risk level: {}", category.label());
            println!("- {message}");
        }
        DisplayState::Failed { detail, .. } => println!("- Scoring failed: {detail}"),
        DisplayState::Idle | DisplayState::Pending { .. } => println!("- No result"),
    }
}

async fn write_report(rendered: &RenderedAssessment, path: PathBuf) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let exporter = ReportExporter::from_config(&config.recommendation)?;
    let document = exporter.export(rendered).await;
    std::fs::write(&path, document.body)?;
    println!("\nReport written to {}", path.display());
    Ok(())
}
