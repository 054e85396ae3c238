use clap::{Parser, Subcommand};
use std::path::PathBuf;

use boatdet::dataset::{DatasetBuilder, DatasetLayout, DatasetPolicy};
use boatdet::detection::DetectionPipeline;
use boatdet::detection::proposals::EdgeRegionProposer;
use boatdet::recognizer::BoatModel;
use boatdet::render;
use boatdet::training::{Trainer, TrainingConfig};
use boatdet::SkippedItem;

#[derive(Parser)]
#[command(name = "boatdet")]
#[command(about = "Build a patch dataset, train a patch classifier and detect boats")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop positive and mine negative patches from annotated images
    BuildDataset {
        /// Directory of images to build samples from
        #[arg(value_name = "IMAGES")]
        image_dir: PathBuf,

        /// Directory of annotation files (label:xmin;xmax;ymin;ymax)
        #[arg(value_name = "ANNOTATIONS")]
        annotation_dir: PathBuf,

        /// Root for the BOATS/ and NONBOATS/ patch directories
        #[arg(long, value_name = "DIR", default_value = "dataset")]
        output: PathBuf,

        /// Mine negatives from every N-th image
        #[arg(long, default_value_t = 2)]
        negative_stride: usize,

        /// Maximum negatives taken from one image
        #[arg(long, default_value_t = 4)]
        negatives_per_image: usize,

        /// Maximum proposals examined per image
        #[arg(long, default_value_t = 2000)]
        proposal_cap: usize,

        /// Proposals must have a larger area than this
        #[arg(long, default_value_t = 1000)]
        min_area: i64,
    },

    /// Train the vocabulary and classifier from patch directories
    Train {
        /// Directory of positive patches
        #[arg(value_name = "POSITIVES")]
        positive_dir: PathBuf,

        /// Directory of negative patches
        #[arg(value_name = "NEGATIVES")]
        negative_dir: PathBuf,

        /// Where to store the trained model
        #[arg(long, value_name = "PATH", default_value = "model.json")]
        model: PathBuf,

        /// Number of visual words
        #[arg(long, default_value_t = 300)]
        vocabulary_size: usize,

        /// Classifier training epochs
        #[arg(long, default_value_t = 2)]
        epochs: usize,

        /// SVM soft-margin penalty
        #[arg(long, default_value_t = 10.0)]
        svm_c: f64,

        /// Seed for clustering and shuffling
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Detect boats in test images and score them against annotations
    Detect {
        /// Directory of test images
        #[arg(value_name = "IMAGES")]
        image_dir: PathBuf,

        /// Directory of annotation files for the test images
        #[arg(value_name = "ANNOTATIONS")]
        annotation_dir: PathBuf,

        /// Boxes overlapping a kept box by more than this IoU are suppressed
        #[arg(value_name = "NMS_THRESHOLD")]
        nms_threshold: f32,

        /// Trained model file
        #[arg(long, value_name = "PATH", default_value = "model.json")]
        model: PathBuf,

        /// Save annotated result images to this directory
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Font used to write IoU values on result images
        #[arg(long, value_name = "PATH", requires = "output")]
        font: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Command::BuildDataset {
            image_dir,
            annotation_dir,
            output,
            negative_stride,
            negatives_per_image,
            proposal_cap,
            min_area,
        } => {
            let proposer = EdgeRegionProposer::default();
            let builder = DatasetBuilder::new(&proposer).with_policy(DatasetPolicy {
                negative_stride,
                negatives_per_image,
                proposal_cap,
                min_area,
            });
            let layout = DatasetLayout::under(&output);
            let summary = builder.build(&image_dir, &annotation_dir, &layout)?;

            println!("\n=== Dataset Summary ===");
            println!("Images processed: {}", summary.images_processed);
            println!("Positive patches: {} in {}", summary.positives, layout.positives.display());
            println!("Negative patches: {} in {}", summary.negatives, layout.negatives.display());
            print_skipped(&summary.skipped);
        }

        Command::Train {
            positive_dir,
            negative_dir,
            model,
            vocabulary_size,
            epochs,
            svm_c,
            seed,
        } => {
            let trainer = Trainer::new(TrainingConfig {
                vocabulary_size,
                svm_epochs: epochs,
                svm_c,
                seed,
                ..Default::default()
            });
            let (trained, summary) = trainer.train(&positive_dir, &negative_dir)?;
            trained.save(&model)?;

            println!("\n=== Training Summary ===");
            println!("Positive patches used: {}", summary.positives);
            println!("Negative patches used: {}", summary.negatives);
            println!("Patches without keypoints: {}", summary.undescribed);
            println!("Vocabulary size: {}", summary.vocabulary_size);
            println!("Model saved to {}", model.display());
            print_skipped(&summary.skipped);
        }

        Command::Detect {
            image_dir,
            annotation_dir,
            nms_threshold,
            model,
            output,
            font,
        } => {
            let trained = BoatModel::load(&model)?;
            let label_font = font.as_deref().map(render::load_font).transpose()?;
            let proposer = EdgeRegionProposer::default();
            let extractor = trained.extractor();
            let mut pipeline = DetectionPipeline::new(&proposer, &extractor, &trained.svm, nms_threshold);
            if let Some(font) = &label_font {
                pipeline = pipeline.with_label_font(font);
            }

            let summary = pipeline.run_directory(&image_dir, &annotation_dir, output.as_deref())?;

            println!("\n=== Detection Summary ===");
            println!("Images processed: {}", summary.images_processed);
            println!("Ground truth boxes: {}", summary.ground_truth);
            println!("Matched: {}", summary.matched);
            println!("Undetected: {}", summary.undetected);
            println!("False positives: {}", summary.false_positives);
            match summary.mean_iou() {
                Some(iou) => println!("Mean IoU over matches: {:.4}", iou),
                None => println!("Mean IoU over matches: n/a"),
            }
            print_skipped(&summary.skipped);
        }
    }

    Ok(())
}

fn print_skipped(skipped: &[SkippedItem]) {
    if skipped.is_empty() {
        return;
    }
    println!("\nSkipped {} item(s):", skipped.len());
    for item in skipped {
        println!("  {}: {}", item.path.display(), item.reason);
    }
}
