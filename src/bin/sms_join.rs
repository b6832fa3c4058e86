//! Reads `<sender> <message>` lines from stdin and answers each JOIN with a
//! queue ticket, one JSON object per line.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use gramqueue::queue::{format_wait, parse_join_sms, QueueAssignment, RandomAssignment};
use gramqueue::FlowConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = FlowConfig::default();
    let mut assigner = RandomAssignment::new(Box::new(StdRng::from_entropy()), &config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (sender, body) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let reply = match parse_join_sms(sender, body) {
            Ok(registration) => {
                let ticket = assigner.assign(&registration);
                json!({
                    "sender": sender,
                    "registration": registration,
                    "ticket": ticket,
                    "wait": format_wait(ticket.wait_minutes),
                })
            }
            Err(e) => {
                warn!("Rejected SMS: {}", e);
                json!({ "sender": sender, "error": e.to_string() })
            }
        };
        println!("{}", reply);
    }
    Ok(())
}
