use crate::CliContext;
use anyhow::Result;
use clap::Parser;

#[derive(Debug, Parser)]
pub struct RecentCommand {
    /// Forget every recent search.
    #[arg(long = "clear")]
    pub clear: bool,
}

impl RecentCommand {
    pub fn run(self) -> Result<()> {
        let store = CliContext::load(None)?.recent_store();
        if self.clear {
            store.clear()?;
            println!("Cleared recent searches.");
            return Ok(());
        }
        let recent = store.recent()?;
        if recent.is_empty() {
            println!("No recent searches.");
            return Ok(());
        }
        for (index, query) in recent.iter().enumerate() {
            println!("{}. {query}", index + 1);
        }
        Ok(())
    }
}
