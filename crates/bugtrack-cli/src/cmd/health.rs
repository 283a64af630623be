use crate::output::{OutputMode, pretty_kv, render};
use bugtrack_cli::ApiClient;

pub fn run_health(client: &ApiClient, output: OutputMode) -> anyhow::Result<()> {
    let health = client.health()?;
    render(output, &health, |health, w| {
        pretty_kv(w, "server", client.base_url())?;
        pretty_kv(w, "status", &health.status)?;
        pretty_kv(w, "timestamp", &health.timestamp)
    })
}
