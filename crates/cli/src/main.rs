//! Catena CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: command-line flags, an optional JSON
//!    [`TransportConfig`] file, and the `CATENA_BASE_URL` override.
//! 2. **Wire observability**: `tracing-subscriber` with pretty or JSON output
//!    and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OTLP span exporter.
//! 3. **Construct infrastructure**: build the [`HttpDispatcher`] and target the
//!    storefront root interface with it.
//! 4. **Run the chain**: each subcommand is one fluent chain ending in a
//!    terminal call; the response body is printed on stdout.
//!
//! Exit status is `0` on success, `75` when the failure is retryable, and `1`
//! otherwise.

mod observability;
mod storefront;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use transport::{HttpDispatcher, Response, TransportConfig, TransportError};

use observability::LogFormat;
use storefront::StoreApi;

/// `EX_TEMPFAIL` from sysexits.h.
const EXIT_RETRYABLE: u8 = 75;

#[derive(Debug, Parser)]
#[command(name = "catena", version, about = "Fluent HTTP client for the storefront API")]
struct Cli {
    /// JSON transport configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL of the storefront API; overrides the configuration file.
    #[arg(long, global = true, env = "CATENA_BASE_URL", value_name = "URL")]
    base_url: Option<String>,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch one store.
    Store { id: String },

    /// Fetch one product.
    Product { store: String, product: String },

    /// Create or update a product.
    AddProduct {
        store: String,
        product: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        amount: i64,
    },

    /// Fetch one SKU of a product.
    Sku {
        store: String,
        product: String,
        sku: String,
    },

    /// List the SKUs of a product.
    Skus {
        store: String,
        product: String,
        /// Page size; values above 10 are capped.
        #[arg(long, default_value_t = storefront::MAX_SKU_PAGE)]
        limit: i64,
    },

    /// Search the employees of a store by name.
    Employees {
        store: String,
        first: String,
        last: String,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Store { .. } => "store",
            Self::Product { .. } => "product",
            Self::AddProduct { .. } => "add-product",
            Self::Sku { .. } => "sku",
            Self::Skus { .. } => "skus",
            Self::Employees { .. } => "employees",
        }
    }

    async fn run(self, api: &StoreApi<HttpDispatcher>) -> Result<Response, TransportError> {
        match self {
            Self::Store { id } => api.get(id).await,
            Self::Product { store, product } => api.products(store)?.get(product).await,
            Self::AddProduct {
                store,
                product,
                price,
                amount,
            } => api.products(store)?.post(product, price, amount).await,
            Self::Sku {
                store,
                product,
                sku,
            } => api.products(store)?.skus(product)?.get(sku).await,
            Self::Skus {
                store,
                product,
                limit,
            } => api.products(store)?.skus(product)?.list(limit).await,
            Self::Employees { store, first, last } => {
                api.employees(store)?.search(first, last).await
            }
        }
    }
}

/// Loads the configuration file, if any, and applies the base URL override.
fn load_config(
    path: Option<&PathBuf>,
    base_url: Option<String>,
) -> anyhow::Result<TransportConfig> {
    let config = match (path, base_url) {
        (Some(path), base_url) => {
            let mut config = TransportConfig::from_json_file(path).with_context(|| {
                format!("failed to load configuration from '{}'", path.display())
            })?;
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }
            config
        }
        (None, Some(base_url)) => TransportConfig::new(base_url),
        (None, None) => {
            anyhow::bail!("no base URL: pass --base-url, set CATENA_BASE_URL, or use --config")
        }
    };
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    let config = load_config(cli.config.as_ref(), cli.base_url)?;
    let dispatcher = HttpDispatcher::new(&config, storefront::endpoints()?)?;
    let api = StoreApi::target(Arc::new(dispatcher)).context("invalid storefront contract")?;

    let command = cli.command.name();
    tracing::info!(command, base_url = %config.base_url, "Running command");

    let response = cli.command.run(&api).await?;
    tracing::info!(command, status = response.status(), "Command completed");
    Ok(response.into_body())
}

/// Pretty-prints JSON bodies; anything else is printed as received.
fn render_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .filter(|value| value.is_object() || value.is_array())
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_owned())
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    let retryable = err
        .downcast_ref::<TransportError>()
        .is_some_and(|e| e.retry_policy().is_retryable());
    if retryable {
        ExitCode::from(EXIT_RETRYABLE)
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match observability::init(cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match run(cli).await {
        Ok(body) => {
            println!("{}", render_body(&body));
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Command failed");
            eprintln!("error: {err:#}");
            exit_code(&err)
        }
    };

    telemetry.shutdown();
    code
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands_and_global_flags() {
        let cli = Cli::try_parse_from([
            "catena",
            "--base-url",
            "http://localhost:8080",
            "skus",
            "store_1",
            "product_1",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Command::Skus {
                store,
                product,
                limit,
            } => {
                assert_eq!((store.as_str(), product.as_str()), ("store_1", "product_1"));
                assert_eq!(limit, storefront::MAX_SKU_PAGE);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn add_product_requires_price_and_amount() {
        assert!(Cli::try_parse_from(["catena", "add-product", "store_1", "product_1"]).is_err());

        let cli = Cli::try_parse_from([
            "catena",
            "add-product",
            "store_1",
            "product_1",
            "--price",
            "42.1",
            "--amount",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.command.name(), "add-product");
    }

    #[test]
    fn config_requires_a_base_url() {
        assert!(load_config(None, None).is_err());
        assert!(load_config(None, Some("ftp://example.com".into())).is_err());

        let config = load_config(None, Some("http://localhost:8080".into())).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn base_url_flag_overrides_config_file() {
        let path = std::env::temp_dir().join(format!("catena-config-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"base_url": "http://file.example", "timeout_ms": 1000}"#,
        )
        .unwrap();

        let from_file = load_config(Some(&path), None).unwrap();
        assert_eq!(from_file.base_url, "http://file.example");
        assert_eq!(from_file.timeout(), Duration::from_secs(1));

        let overridden = load_config(Some(&path), Some("http://flag.example".into())).unwrap();
        assert_eq!(overridden.base_url, "http://flag.example");
        assert_eq!(overridden.timeout_ms, 1000);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn json_bodies_are_pretty_printed() {
        assert_eq!(render_body(r#"{"id":"p1"}"#), "{\n  \"id\": \"p1\"\n}");
        assert_eq!(render_body("foo"), "foo");
        assert_eq!(render_body("42"), "42");
    }

    #[test]
    fn retryable_failures_use_tempfail_exit_code() {
        let busy = anyhow::Error::new(TransportError::Status {
            status: 503,
            body: String::new(),
            retry_after: None,
        });
        assert_eq!(exit_code(&busy), ExitCode::from(EXIT_RETRYABLE));

        let missing = anyhow::Error::new(TransportError::Status {
            status: 404,
            body: String::new(),
            retry_after: None,
        });
        assert_eq!(exit_code(&missing), ExitCode::FAILURE);
        assert_eq!(exit_code(&anyhow::anyhow!("no base URL")), ExitCode::FAILURE);
    }
}
