use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use facedetect::{DetectionParams, DetectorConfig, FaceDetectionPipeline, UploadedImage};

#[derive(Parser)]
#[command(name = "facedetect")]
#[command(about = "Detect faces in images via an external detection worker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct WorkerArgs {
    /// Interpreter used to run the worker script
    #[arg(long, default_value = "python")]
    executable: PathBuf,

    /// Path to the detection worker script
    #[arg(long, value_name = "SCRIPT")]
    script: PathBuf,

    /// Directory for staged upload copies (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Maximum accepted upload size in bytes
    #[arg(long, default_value_t = facedetect::config::DEFAULT_MAX_UPLOAD_SIZE)]
    max_upload_size: u64,

    /// Kill the worker if it runs longer than this many seconds
    #[arg(long, value_name = "SECS")]
    worker_timeout: Option<u64>,
}

impl WorkerArgs {
    fn into_config(self) -> DetectorConfig {
        let mut config = DetectorConfig::new(self.script)
            .with_executable(self.executable)
            .with_max_upload_size(self.max_upload_size)
            .with_worker_timeout(self.worker_timeout.map(Duration::from_secs));
        if let Some(temp_dir) = self.temp_dir {
            config = config.with_temp_dir(temp_dir);
        }
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    #[cfg(feature = "server")]
    Serve {
        #[command(flatten)]
        worker: WorkerArgs,

        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: std::net::SocketAddr,
    },

    /// Detect faces in a local image file and print the result
    Detect {
        #[command(flatten)]
        worker: WorkerArgs,

        /// Path to the input image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Minimum face size in pixels
        #[arg(long, default_value_t = DetectionParams::default().min_size)]
        min_size: u32,

        /// How much the image size is reduced at each detection scale
        #[arg(long, default_value_t = DetectionParams::default().scale_factor)]
        scale_factor: f64,

        /// How many neighbors each candidate rectangle must retain
        #[arg(long, default_value_t = DetectionParams::default().min_neighbors)]
        min_neighbors: u32,

        /// Print the raw JSON response instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facedetect=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "server")]
        Command::Serve { worker, listen } => {
            facedetect::server::serve(listen, worker.into_config()).await?;
        }
        Command::Detect {
            worker,
            image,
            min_size,
            scale_factor,
            min_neighbors,
            json,
        } => {
            let config = worker.into_config();
            let pipeline = FaceDetectionPipeline::new(&config);

            let filename = image
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
            let content_type = filename.as_deref().and_then(content_type_for);
            let data = tokio::fs::read(&image).await?;
            let upload = UploadedImage::new(data, filename, content_type);

            let params = DetectionParams {
                min_size,
                scale_factor,
                min_neighbors,
            };
            let response = pipeline.detect(&upload, &params).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_summary(&response);
            }
        }
    }

    Ok(())
}

/// Maps a filename to the content type the validator expects. The HTTP
/// layer gets this from the multipart header; for local files we derive it
/// from the extension.
fn content_type_for(filename: &str) -> Option<String> {
    let extension = filename.rsplit('.').next()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        _ => return None,
    };
    Some(content_type.to_string())
}

fn print_summary(response: &facedetect::DetectionResponse) {
    println!("\n=== Face Detection Results ===");
    println!("Status: {}", if response.is_success() { "ok" } else { "failed" });
    println!("Message: {}", response.message());
    println!("Faces detected: {}", response.data().face_count());

    for (i, face) in response.data().faces().iter().enumerate() {
        println!(
            "  Face {}: x={}, y={}, {}x{}",
            i + 1,
            face.x,
            face.y,
            face.width,
            face.height
        );
    }
}
