use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use smartfit::core::measurement::MeasurementFlow;
use smartfit::core::photo::{read_image_file, PhotoSource};
use smartfit::core::pose_capture::PoseCaptureFlow;
use smartfit::core::try_on::{CatalogTryOn, FormTryOn, TryOnDialog};
use smartfit::domain::model::{Cart, MeasurementForm, TryOnResult};
use smartfit::domain::ports::{CameraDevice, CatalogSource, ConfigProvider, MlService};
use smartfit::utils::error::{ErrorSeverity, Result};
use smartfit::utils::{logger, validation::Validate};
use smartfit::{
    AppConfig, CaptureSession, HttpCatalogClient, HttpMlClient, LocalStorage, ProcessCamera,
    SessionStore,
};

#[derive(Parser)]
#[command(name = "smartfit")]
#[command(about = "SmartFit virtual try-on client")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the ML service is reachable
    Health,
    /// Estimate pose from a photo and keep it for the next steps
    Pose(PhotoArgs),
    /// Fetch, edit and save body measurements
    Measure {
        /// Override a field, e.g. --set chest=96.5
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, f64)>,

        /// Skip the ML call and edit the last saved measurements
        #[arg(long)]
        no_fetch: bool,

        /// Save the resulting measurements to the session
        #[arg(long)]
        save: bool,
    },
    /// Try a garment photo on a user photo
    TryOn {
        #[arg(long)]
        user: PathBuf,

        #[arg(long)]
        garment: PathBuf,

        /// Where to write the result image [default: tryon-result.<format>]
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Add products to a cart and print the total
    Cart {
        #[arg(required = true)]
        ids: Vec<u32>,
    },
    /// Inspect or reset the capture session
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

#[derive(Subcommand)]
enum CatalogCommand {
    List,
    Show {
        id: u32,
    },
    /// Try a catalog product on your photo
    TryOn {
        id: u32,

        #[command(flatten)]
        photo: PhotoArgs,

        /// Where to write the result image [default: tryon-result.<format>]
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SessionCommand {
    Show,
    Clear,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PhotoArgs {
    /// Read the photo from a file
    #[arg(long, alias = "image")]
    photo: Option<PathBuf>,

    /// Take the photo with the configured camera
    #[arg(long)]
    camera: bool,
}

fn parse_assignment(raw: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid number for '{}': {}", name.trim(), e))?;
    Ok((name.trim().to_string(), value))
}

struct Context {
    config: AppConfig,
    sessions: SessionStore<LocalStorage>,
}

impl Context {
    fn load(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::from_env()?,
        };
        config.validate()?;

        let sessions = SessionStore::new(LocalStorage::new(config.session_directory()));
        Ok(Self { config, sessions })
    }

    fn ml(&self) -> Result<HttpMlClient> {
        HttpMlClient::from_config(&self.config)
    }

    fn catalog(&self) -> Result<HttpCatalogClient> {
        HttpCatalogClient::from_config(&self.config)
    }

    fn frame_timeout(&self) -> Duration {
        Duration::from_secs(self.config.camera.frame_timeout_seconds)
    }

    fn photo_source(&self, args: &PhotoArgs) -> PhotoSource {
        match &args.photo {
            Some(path) => PhotoSource::File(path.clone()),
            None => PhotoSource::Camera {
                frame_timeout: self.frame_timeout(),
            },
        }
    }

    fn camera_for(&self, args: &PhotoArgs) -> Result<Option<ProcessCamera>> {
        if args.camera {
            ProcessCamera::from_config(&self.config.camera).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low | ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(cli.config.as_deref())?;

    match cli.command {
        Command::Health => {
            let status = ctx.ml()?.health().await?;
            println!("✅ ML service at {} is up", ctx.config.ml_service_url());
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Pose(args) => pose(&ctx, &args).await?,
        Command::Measure { set, no_fetch, save } => measure(&ctx, &set, no_fetch, save).await?,
        Command::TryOn { user, garment, out } => {
            let user = read_image_file(&user).await?;
            let garment = read_image_file(&garment).await?;
            let session = ctx.sessions.load().await?;

            let flow = FormTryOn::new(ctx.ml()?);
            let result = flow.run(Some(&user), Some(&garment), &session).await?;
            write_result(&result, out.as_deref()).await?;
        }
        Command::Catalog { command } => catalog(&ctx, command).await?,
        Command::Cart { ids } => {
            let client = ctx.catalog()?;
            let mut cart = Cart::new();
            for id in ids {
                cart.add(client.get_product(id).await?);
            }

            println!("🛒 Cart ({} items)", cart.len());
            for product in cart.items() {
                println!("  #{:<3} {:<24} ${:>8.2}", product.id, product.name, product.price);
            }
            println!("  Total: ${:.2}", cart.total());
        }
        Command::Session { command } => match command {
            SessionCommand::Show => print_session(&ctx.sessions.load().await?),
            SessionCommand::Clear => {
                ctx.sessions.clear().await?;
                println!("🧹 Session cleared");
            }
        },
    }

    Ok(())
}

async fn pose(ctx: &Context, args: &PhotoArgs) -> Result<()> {
    let camera = ctx.camera_for(args)?;
    let image = ctx
        .photo_source(args)
        .acquire(camera.as_ref().map(|c| c as &dyn CameraDevice))
        .await?;

    let mut session = ctx.sessions.load().await?;
    let flow = PoseCaptureFlow::new(ctx.ml()?);
    let result = flow.estimate(image, &mut session).await?;
    ctx.sessions.save(&session).await?;

    println!("✅ Pose estimated");
    println!("  Landmarks: {}", result.landmark_count());
    if let Some(confidence) = result.confidence {
        println!("  Confidence: {:.2}", confidence);
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn measure(ctx: &Context, set: &[(String, f64)], no_fetch: bool, save: bool) -> Result<()> {
    let mut session = ctx.sessions.load().await?;
    let mut form = session
        .measurements()
        .map(MeasurementForm::from_measurements)
        .unwrap_or_default();

    let flow = MeasurementFlow::new(ctx.ml()?);
    if !no_fetch {
        flow.fetch(&session, &mut form).await?;
    }

    for (name, value) in set {
        form.set(name, *value)?;
    }

    println!("📏 Measurements (cm)");
    for name in form.field_names() {
        match form.get(name) {
            Some(value) => println!("  {:<8} {:>7.1}", name, value),
            None => println!("  {:<8} {:>7}", name, "-"),
        }
    }

    if save {
        flow.save(&form, &mut session)?;
        ctx.sessions.save(&session).await?;
        println!("💾 Measurements saved");
    }
    Ok(())
}

async fn catalog(ctx: &Context, command: CatalogCommand) -> Result<()> {
    let client = ctx.catalog()?;

    match command {
        CatalogCommand::List => {
            for product in client.list_products().await? {
                println!("  #{:<3} {:<24} ${:>8.2}", product.id, product.name, product.price);
            }
        }
        CatalogCommand::Show { id } => {
            let product = client.get_product(id).await?;
            println!("{} (#{})", product.name, product.id);
            println!("  Price: ${:.2}", product.price);
            println!("  Image: {}", product.image);
            println!("  {}", product.description);
        }
        CatalogCommand::TryOn { id, photo, out } => {
            let product = client.get_product(id).await?;
            let mut dialog = TryOnDialog::new();
            dialog.select(product);

            match &photo.photo {
                Some(path) => dialog.use_photo(read_image_file(path).await?),
                None => {
                    let camera = ProcessCamera::from_config(&ctx.config.camera)?;
                    dialog.open_camera(&camera, ctx.frame_timeout()).await?;
                    dialog.capture_photo().await?;
                }
            }

            let flow = CatalogTryOn::new(ctx.ml()?, client);
            let result = flow.submit(&mut dialog).await?;
            dialog.close();
            write_result(&result, out.as_deref()).await?;
        }
    }
    Ok(())
}

async fn write_result(result: &TryOnResult, out: Option<&Path>) -> Result<()> {
    let out = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(result.default_file_name()));
    tokio::fs::write(&out, result.image.bytes()).await?;
    println!("✅ Try-on result saved to {}", out.display());
    if let Some(confidence) = result.confidence {
        println!("  Confidence: {:.2}", confidence);
    }
    Ok(())
}

fn print_session(session: &CaptureSession) {
    println!("📋 Capture session");
    match session.pose() {
        Some(captured) => println!(
            "  Pose: {} landmarks, captured {}",
            captured.result.landmark_count(),
            captured.captured_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("  Pose: none"),
    }
    match session.measurements() {
        Some(measurements) => {
            for (name, value) in &measurements.0 {
                println!("  {:<8} {:>7.1}", name, value);
            }
        }
        None => println!("  Measurements: none"),
    }
}
