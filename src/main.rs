//! # Labelpress CLI
//!
//! Command-line interface for label rendering and sheet layout.
//!
//! ## Usage
//!
//! ```bash
//! # Render label 3 of a template's run
//! labelpress render --template templates/12.json --output unit.png --sequence 3
//!
//! # How many 500x300 labels fit on the default sheet
//! labelpress capacity --label-width 500 --label-height 300
//!
//! # Tile a unit label onto a print sheet
//! labelpress sheet unit.png sheets/12.png --padding 10
//!
//! # QR payloads
//! labelpress qr encode 7 3 1700000000000
//! labelpress qr decode N3wzfDE3MDAwMDAwMDAwMDA=
//!
//! # HTTP service
//! labelpress serve --listen 0.0.0.0:8080 --assets /srv/labels
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use labelpress::{
    LabelError, LabelCompositor,
    config::{
        DEFAULT_LISTEN_ADDR, DEFAULT_PADDING, DEFAULT_QR_HOST, DEFAULT_SHEET_HEIGHT,
        DEFAULT_SHEET_WIDTH, RenderConfig, SheetSpec,
    },
    qr::{self, payload},
    render::probe_dimensions,
    server::{self, ServerConfig},
    sheet::{calculate_capacity, create_composite_sheet},
    template::{DynamicFieldContext, LabelTemplate},
};

/// Labelpress - Product label rendering and print sheet layout
#[derive(Parser, Debug)]
#[command(name = "labelpress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TrueType font for text elements (defaults to the built-in bitmap font)
    #[arg(long, global = true, value_name = "FILE")]
    font: Option<PathBuf>,

    /// TrueType font for bold text elements
    #[arg(long, global = true, value_name = "FILE")]
    bold_font: Option<PathBuf>,

    /// Host embedded in QR code URLs
    #[arg(long, global = true, default_value = DEFAULT_QR_HOST)]
    qr_host: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a unit label from a template
    Render {
        /// Template JSON file
        #[arg(long, value_name = "FILE")]
        template: PathBuf,

        /// Output PNG path
        #[arg(long, value_name = "FILE")]
        output: PathBuf,

        /// Sequence number of the label within the run
        #[arg(long, default_value = "1")]
        sequence: u32,

        /// Creation time for the QR identity (defaults to the template's)
        #[arg(long)]
        epoch_ms: Option<i64>,

        #[arg(long)]
        register_no: Option<String>,

        #[arg(long)]
        lot_no: Option<String>,

        #[arg(long)]
        production_date: Option<String>,

        #[arg(long)]
        expiry_date: Option<String>,

        #[arg(long)]
        sticker_no: Option<String>,
    },

    /// Compute how many labels fit on a sheet
    Capacity {
        #[arg(long)]
        label_width: u32,

        #[arg(long)]
        label_height: u32,

        /// Sheet width in pixels
        #[arg(long, default_value_t = DEFAULT_SHEET_WIDTH)]
        width: u32,

        /// Sheet height in pixels
        #[arg(long, default_value_t = DEFAULT_SHEET_HEIGHT)]
        height: u32,

        /// Padding on every side of each label
        #[arg(long, default_value_t = DEFAULT_PADDING, allow_negative_numbers = true)]
        padding: i64,
    },

    /// Tile a unit label onto a print sheet
    Sheet {
        /// Unit label PNG
        unit_label: PathBuf,

        /// Output sheet PNG
        output: PathBuf,

        #[arg(long, default_value_t = DEFAULT_SHEET_WIDTH)]
        width: u32,

        #[arg(long, default_value_t = DEFAULT_SHEET_HEIGHT)]
        height: u32,

        #[arg(long, default_value_t = DEFAULT_PADDING, allow_negative_numbers = true)]
        padding: i64,
    },

    /// Encode or decode QR payloads
    Qr {
        #[command(subcommand)]
        action: QrAction,
    },

    /// Print the dimensions and format of an image
    Probe {
        image: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
        listen: String,

        /// Directory request paths are resolved against
        #[arg(long, default_value = ".")]
        assets: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum QrAction {
    /// Encode a label identity into a payload
    Encode {
        template_id: u64,
        sequence_no: u32,
        epoch_ms: i64,
    },
    /// Decode a payload into its fields
    Decode { payload: String },
    /// List the payloads of a whole run
    Batch {
        template_id: u64,
        quantity: u32,
        epoch_ms: i64,
    },
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "labelpress=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), LabelError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| LabelError::Encode(format!("JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}

#[derive(Serialize)]
struct EncodedPayload {
    payload: String,
    url: String,
}

fn run() -> Result<(), LabelError> {
    let cli = Cli::parse();
    let render_config =
        || RenderConfig::load(&cli.qr_host, cli.font.as_deref(), cli.bold_font.as_deref());

    match &cli.command {
        Commands::Render {
            template,
            output,
            sequence,
            epoch_ms,
            register_no,
            lot_no,
            production_date,
            expiry_date,
            sticker_no,
        } => {
            let mut template = LabelTemplate::load(template)?;
            if let Some(epoch_ms) = epoch_ms {
                template.created_at_ms = *epoch_ms;
            }
            let overrides = DynamicFieldContext {
                register_no: register_no.clone(),
                lot_no: lot_no.clone(),
                production_date: production_date.clone(),
                expiry_date: expiry_date.clone(),
                sticker_no: sticker_no.clone(),
                qr_payload: None,
            };

            let config = render_config()?;
            let label = LabelCompositor::new(&config).render_template(&template, *sequence, &overrides)?;
            label.write_png(output)?;

            for degraded in &label.degraded {
                eprintln!(
                    "Element {} ({}) degraded: {}",
                    degraded.index,
                    degraded.kind.name(),
                    degraded.reason
                );
            }
            println!(
                "Saved {}x{} label to {}",
                label.width(),
                label.height(),
                output.display()
            );
        }

        Commands::Capacity {
            label_width,
            label_height,
            width,
            height,
            padding,
        } => {
            let layout = calculate_capacity(*label_width, *label_height, *width, *height, *padding);
            print_json(&layout)?;
        }

        Commands::Sheet {
            unit_label,
            output,
            width,
            height,
            padding,
        } => {
            let report = create_composite_sheet(
                unit_label,
                output,
                SheetSpec::new(*width, *height, *padding),
            );
            print_json(&report)?;
            if !report.success {
                std::process::exit(1);
            }
        }

        Commands::Qr { action } => match action {
            QrAction::Encode {
                template_id,
                sequence_no,
                epoch_ms,
            } => {
                let payload = payload::encode(*template_id, *sequence_no, *epoch_ms);
                let url = qr::target_url(&cli.qr_host, &payload);
                print_json(&EncodedPayload { payload, url })?;
            }
            QrAction::Decode { payload } => {
                print_json(&qr::decode(payload)?)?;
            }
            QrAction::Batch {
                template_id,
                quantity,
                epoch_ms,
            } => {
                for identity in payload::batch(*template_id, *quantity, *epoch_ms) {
                    println!("{}\t{}", identity.sequence_no, identity.encode());
                }
            }
        },

        Commands::Probe { image } => {
            print_json(&probe_dimensions(image)?)?;
        }

        Commands::Serve { listen, assets } => {
            let config = ServerConfig {
                listen_addr: listen.clone(),
                asset_root: assets.clone(),
            };
            let render = render_config()?;

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config, render))?;
        }
    }

    Ok(())
}
