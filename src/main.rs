//! Krishi CLI
//!
//! Usage:
//!   krishi --interactive                    # Walk the assessment on stdin
//!   krishi --outcomes t,f,t,t               # Single-shot evaluation
//!   krishi --serve                          # HTTP API server
//!   krishi --outcomes t,f,t,t --json        # JSON output

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;

use krishi::core::{Adaptive, EngineConfig, MemoryTierStore, SpeechBackend};
use krishi::types::{LanguageCode, SignalStep, SynthesisError, Tier, UIPolicy, UserId};
use krishi::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "krishi",
    version = VERSION,
    about = "Krishi - capability assessment and adaptive UI policy engine",
    long_about = "Krishi runs the four-step capability assessment (swipe, tap,\n\
                  navigate, capture), classifies the resulting score into a\n\
                  literacy tier, and resolves the tier into concrete UI/voice\n\
                  parameters.\n\n\
                  Modes:\n  \
                  --interactive  Walk the assessment step by step on stdin\n  \
                  --outcomes     Evaluate a fixed outcome vector (t,f,t,t)\n  \
                  --serve        HTTP API server mode\n\n\
                  Tiers:\n  \
                  LOW     - large controls, voice assist, linear layout\n  \
                  MEDIUM  - medium controls, grid layout\n  \
                  HIGH    - small controls, advanced layout"
)]
struct Args {
    /// Interactive mode - answer y/n per assessment step
    #[arg(short, long)]
    interactive: bool,

    /// Fixed outcome vector, comma separated (t/f, y/n, true/false)
    #[arg(short, long)]
    outcomes: Option<String>,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// JSON config file overriding threshold/policy tables
    #[arg(long)]
    config: Option<String>,

    /// User identity (phone number) for the assessment
    #[arg(long, default_value = "demo")]
    user: String,

    /// Language for spoken prompts
    #[arg(long, default_value = "en")]
    language: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

/// Stand-in speech backend for CLI runs: "synthesizes" the prompt text
/// itself. Deployments plug a real TTS behind the same trait.
struct EchoSpeechBackend;

#[async_trait]
impl SpeechBackend for EchoSpeechBackend {
    async fn synthesize(
        &self,
        text: &str,
        _language: &LanguageCode,
    ) -> Result<Vec<u8>, SynthesisError> {
        Ok(text.as_bytes().to_vec())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Table misconfiguration is fatal at startup; never fall back
    let config = match &args.config {
        Some(path) => match EngineConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Invalid config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let service = Arc::new(Adaptive::new(
        config,
        Arc::new(MemoryTierStore::new()),
        Arc::new(EchoSpeechBackend),
    ));

    if args.serve {
        run_serve(&args, service).await;
    } else if let Some(ref outcomes) = args.outcomes {
        run_single(outcomes, &args, service).await;
    } else if args.interactive {
        run_interactive(&args, service).await;
    } else {
        // Default to interactive if no mode specified
        run_interactive(&args, service).await;
    }
}

/// Evaluate a fixed outcome vector
async fn run_single(outcomes: &str, args: &Args, service: Arc<Adaptive>) {
    let outcomes = match parse_outcomes(outcomes) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let session = service
        .begin_assessment(UserId::new(args.user.clone()))
        .await;

    let mut last = None;
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match service.submit_signal(&session, index, outcome).await {
            Ok(output) => last = Some(output),
            Err(e) => {
                eprintln!("step {} failed: {}", index, e);
                std::process::exit(1);
            }
        }
    }

    let output = last.expect("four steps were submitted");
    let tier = output.tier.expect("final step carries the tier");
    let policy = service.resolve_policy(tier);

    if args.json {
        let report = serde_json::json!({
            "score": output.score,
            "tier": tier,
            "policy": policy,
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        print_result(output.score.unwrap_or(0), tier, &policy, args.no_color);
    }
}

/// Walk the assessment step by step on stdin
async fn run_interactive(args: &Args, service: Arc<Adaptive>) {
    print_header(args.no_color);
    println!("Answer y/n for each step. Type 'quit' to abandon.");
    println!();

    let user = UserId::new(args.user.clone());
    let language = LanguageCode::new(&args.language);
    let session = service.begin_assessment(user.clone()).await;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for step in SignalStep::all() {
        // Spoken guidance honors the user's current (pre-assessment) policy
        if let Ok(outcome) = service.speak_for(&user, step.prompt(), &language).await {
            if let krishi::core::SpeechOutcome::Spoken(asset) = outcome {
                tracing::debug!(bytes = asset.bytes().len(), "prompt audio ready");
            }
        }

        let outcome = loop {
            print!(
                "[{}/4] {} - passed? (y/n) > ",
                step.index() + 1,
                step.prompt()
            );
            let _ = stdout.flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => {
                    service.abandon(&session).await;
                    println!("\nAssessment abandoned. No tier recorded.");
                    return;
                }
                Ok(_) => {}
            }

            let line = line.trim();
            if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
                service.abandon(&session).await;
                println!("\nAssessment abandoned. No tier recorded.");
                return;
            }
            match parse_outcome_token(line) {
                Some(v) => break v,
                None => println!("Please answer y or n."),
            }
        };

        match service.submit_signal(&session, step.index(), outcome).await {
            Ok(output) => {
                if let (Some(score), Some(tier)) = (output.score, output.tier) {
                    println!();
                    let policy = service.resolve_policy(tier);
                    if args.json {
                        let report = serde_json::json!({
                            "score": score,
                            "tier": tier,
                            "policy": policy,
                        });
                        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
                    } else {
                        print_result(score, tier, &policy, args.no_color);
                    }
                }
            }
            Err(e) => {
                eprintln!("step failed: {}", e);
                service.abandon(&session).await;
                return;
            }
        }
    }
}

/// Run HTTP API server
async fn run_serve(args: &Args, service: Arc<Adaptive>) {
    println!("Krishi v{} - API server", VERSION);
    if let Err(e) = krishi::core::run_server(&args.addr, service).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Parse a comma-separated outcome vector: "t,f,true,n" etc.
fn parse_outcomes(raw: &str) -> Result<Vec<bool>, String> {
    let tokens: Vec<&str> = raw.split(',').map(str::trim).collect();
    if tokens.len() != SignalStep::all().len() {
        return Err(format!(
            "expected {} outcomes, got {}",
            SignalStep::all().len(),
            tokens.len()
        ));
    }
    tokens
        .into_iter()
        .map(|t| parse_outcome_token(t).ok_or_else(|| format!("cannot parse outcome '{}'", t)))
        .collect()
}

/// Parse one outcome token
fn parse_outcome_token(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "1" | "pass" => Some(true),
        "f" | "false" | "n" | "no" | "0" | "fail" => Some(false),
        _ => None,
    }
}

/// Print header
fn print_header(no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Krishi v{} - Capability Assessment", VERSION);
        println!("========================================");
    } else {
        println!("\x1b[1m========================================\x1b[0m");
        println!("\x1b[1m  Krishi v{} - Capability Assessment\x1b[0m", VERSION);
        println!("\x1b[1m========================================\x1b[0m");
    }
}

/// Print the assessment result and resolved policy
fn print_result(score: u8, tier: Tier, policy: &UIPolicy, no_color: bool) {
    let color = if no_color { "" } else { tier.color_code() };
    let reset = if no_color { "" } else { Tier::color_reset() };

    println!("{}score={}/4 | tier={}{}", color, score, tier, reset);
    println!(
        "  controls={} ({}px) | icons={}px | layout={}",
        policy.control_size, policy.control_px, policy.icon_px, policy.layout
    );
    println!(
        "  voice_assist={} | help_overlay={}",
        if policy.voice_assist { "on" } else { "off" },
        if policy.help_overlay { "on" } else { "off" }
    );
}
