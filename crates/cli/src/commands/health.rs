use voketag_core::{Error, Result};

use crate::context::Context;
use crate::output::print_json;

pub async fn execute(ctx: &Context, ready: bool) -> Result<()> {
    let services = ctx
        .clients
        .health
        .check_all(ctx.clients.http(), ctx.config.http.timeout, ready)
        .await;

    if ctx.json {
        print_json(&services)?;
    } else {
        for health in &services {
            let mark = if health.is_up() { "✓" } else { "✗" };
            println!(
                "{mark} {:<14} {:<10} {:>5}ms  {}",
                health.service, health.status, health.latency_ms, health.url
            );
            if let Some(error) = &health.error {
                println!("    {error}");
            }
        }
    }

    let down: Vec<&str> = services
        .iter()
        .filter(|h| !h.is_up())
        .map(|h| h.service.as_str())
        .collect();
    if down.is_empty() {
        Ok(())
    } else {
        Err(Error::network(down.join(", "), "service not healthy"))
    }
}
