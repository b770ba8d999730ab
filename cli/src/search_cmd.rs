use crate::CliContext;
use crate::drive_until_settled;
use crate::render;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use clap::ValueEnum;
use marquee_search::OverlayAction;
use marquee_search::OverlayController;
use marquee_search::OverlayEventSender;
use marquee_search::OverlayOptions;
use marquee_search::OverlayStatus;
use marquee_search::TypeTag;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Parser)]
pub struct SearchCommand {
    /// Search text.
    #[arg(value_name = "QUERY", num_args = 1.., required = true, trailing_var_arg = true)]
    pub query: Vec<String>,

    /// Only show results of this type (event, venue, organizer, series, list).
    #[arg(long = "type", value_name = "TYPE")]
    pub type_filter: Option<TypeTag>,

    /// Tenant scope to search in.
    #[arg(long = "scope")]
    pub scope: Option<String>,

    /// Activate the row at this index: print its link and remember the query.
    #[arg(long = "select", value_name = "INDEX")]
    pub select: Option<usize>,

    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Override the configured search endpoint.
    #[arg(long = "endpoint")]
    pub endpoint: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl SearchCommand {
    pub async fn run(self) -> Result<()> {
        let ctx = CliContext::load(self.endpoint)?;
        let backend = ctx.backend()?;
        let mut options = OverlayOptions::from(&ctx.config);
        // The whole query is known up front.
        options.debounce = Duration::ZERO;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut overlay = OverlayController::new(
            options,
            backend,
            ctx.cache(),
            Some(ctx.recent_store()),
            OverlayEventSender::new(tx),
        );
        overlay.set_scope(self.scope);
        overlay.open();
        overlay.set_type_filter(self.type_filter);
        overlay.set_input(&self.query.join(" "));
        drive_until_settled(&mut overlay, &mut rx).await;

        match overlay.status() {
            OverlayStatus::Failed(err) => return Err(err.clone().into()),
            OverlayStatus::Idle => bail!(
                "query must be at least {} characters",
                ctx.config.min_query_length
            ),
            _ => {}
        }

        if let Some(index) = self.select {
            let OverlayAction::Navigate(result) = overlay.activate(index) else {
                bail!("no result at index {index}");
            };
            match self.output_format {
                OutputFormat::Text => println!("{}", result.href),
                OutputFormat::Json => println!(
                    "{}",
                    json!({ "id": result.id, "type": result.kind, "href": result.href })
                ),
            }
            return Ok(());
        }

        match self.output_format {
            OutputFormat::Text => print!("{}", render::snapshot(&overlay)),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&render::page_json(&overlay))?
                );
            }
        }
        Ok(())
    }
}
