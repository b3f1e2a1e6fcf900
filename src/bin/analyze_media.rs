use anyhow::{Context, Result};
use visual_ai_lib::models::MediaDescriptor;
use visual_ai_lib::services::config_store::ConfigStore;
use visual_ai_lib::api::{analyze_content, get_settings};

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  cargo run --bin analyze_media -- <descriptors.json> [--elements <n>] [--out <json_path>]\n\nNotes:\n  - The input is a JSON array of media descriptors:\n    [{{\"kind\":\"image\",\"sourceUrl\":\"...\",\"width\":1024,\"height\":1024}}]\n  - Settings (concurrency, notification threshold) come from the visualAI config file."
        );
        return Ok(());
    }

    visual_ai_lib::init_logging();

    let path = args[1].clone();
    let elements_n: usize = parse_arg_value(&args, "--elements")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);
    let out_path = parse_arg_value(&args, "--out");

    let raw = std::fs::read_to_string(&path).with_context(|| format!("read {} failed", path))?;
    let media: Vec<MediaDescriptor> =
        serde_json::from_str(&raw).with_context(|| format!("parse descriptors from {} failed", path))?;

    let settings = get_settings(&ConfigStore::open_default());
    let response = analyze_content(media, &settings).await;
    let data = &response.data;

    println!("File: {}", path);
    println!("Session: {}", data.session_id);
    println!("Status: {:?}", data.analysis_status);
    if let Some(ref err) = response.error {
        println!("Error: {}", err);
    }
    println!("AI probability: {:.1}%", data.ai_probability * 100.0);
    println!("Confidence: {:.1}%", data.confidence * 100.0);
    println!("Media analyzed: {}", data.media_count);
    println!();

    for (name, value) in &data.indicators {
        println!("  {:<26} {:>5.1}%", name, value * 100.0);
    }
    if !data.indicators.is_empty() {
        println!();
    }

    for (i, m) in data.media_elements.iter().take(elements_n).enumerate() {
        println!(
            "[M{:03}] {:<5} {:>9} ai={:>5.1}% conf={:>5.1}% {}  {}",
            i,
            m.media_type,
            m.size,
            m.ai_score * 100.0,
            m.confidence * 100.0,
            if m.is_ai { "AI" } else { "--" },
            preview(&m.src, 80)
        );
    }
    if data.media_elements.len() > elements_n {
        println!("... ({} more elements)", data.media_elements.len() - elements_n);
    }
    if response.notify {
        println!();
        println!("Notice: page probability exceeds the configured threshold");
    }

    if let Some(out_path) = out_path {
        let json = serde_json::to_string_pretty(&response)?;
        std::fs::write(&out_path, json).with_context(|| format!("write {} failed", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
