//! Tools listing command

use anyhow::Result;
use noteflow_core::tools::catalog;

/// Show the tools the assistant may call
pub async fn tools_command(json: bool) -> Result<()> {
    let tools = catalog();

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    println!("Available tools\n");
    for tool in tools {
        println!("  {}", tool.name);
        // First line only; schemas are available with --json
        let first_line = tool.description.lines().next().unwrap_or(tool.description);
        println!("      {}\n", first_line);
    }

    Ok(())
}
