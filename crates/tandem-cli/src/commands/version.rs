use anyhow::Result;
use console::style;

pub async fn execute() -> Result<()> {
    println!(
        "{} {}",
        style("tandem").green().bold(),
        style(env!("CARGO_PKG_VERSION")).dim()
    );
    Ok(())
}
