use clap::Args;
use serde_json::{json, Value};

use deal_calc_core::verdict::{classify, verdict_copy_table};

/// Arguments for verdict classification
#[derive(Args)]
pub struct VerdictArgs {
    /// Deal score, 0 to 100
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub score: u8,
}

pub fn run_verdict(args: VerdictArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let verdict = classify(args.score);
    Ok(json!({
        "dealScore": args.score,
        "verdict": verdict,
        "copy": verdict.copy(),
    }))
}

pub fn run_copy() -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<Value> = verdict_copy_table()
        .into_iter()
        .map(|(verdict, copy)| {
            json!({
                "verdict": verdict,
                "emoji": copy.emoji,
                "headline": copy.headline,
                "message": copy.message,
                "color": copy.color,
                "cta": copy.cta,
            })
        })
        .collect();
    Ok(Value::Array(rows))
}
