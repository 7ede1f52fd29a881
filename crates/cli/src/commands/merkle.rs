use voketag_anchor::{MerkleTreeView, NodePath};
use voketag_core::Result;

use crate::context::Context;
use crate::output::print_json;

pub async fn execute(ctx: &Context, batch_id: &str, expand: &[String]) -> Result<()> {
    let response = ctx.clients.admin.merkle_tree(batch_id).await?;
    if ctx.json {
        return print_json(&response);
    }

    let mut view = MerkleTreeView::from_response(&response);
    for raw in expand {
        let path: NodePath = raw.parse()?;
        if !view.toggle(&path) {
            tracing::warn!(path = %raw, "no inner node at this path");
        }
    }
    println!("{}", view.render_text());
    if let Some(message) = &response.message {
        println!("{message}");
    }
    Ok(())
}
