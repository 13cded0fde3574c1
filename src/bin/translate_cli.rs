use std::io::{self, BufRead};
use std::sync::Arc;

use azure_translate_adapter::providers::azure_translate;
use azure_translate_adapter::{
    AzureTranslateAdapter, ChannelOutput, InputSource, Outcome, ProcessorRuntime, Record,
    TranslatorConfig,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_LOG_FILTER: &str = "azure_translate_adapter=info";

struct CliOptions {
    to_language: Option<String>,
    from_language: Option<String>,
    pretty_print_response: bool,
    max_in_flight: usize,
    text: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let options = parse_options(std::env::args().skip(1).collect())?;
    let config = apply_options(TranslatorConfig::from_env()?, &options);

    let adapter: Arc<AzureTranslateAdapter> = Arc::new(AzureTranslateAdapter::new(config)?);
    let runtime = ProcessorRuntime::builder(adapter)
        .with_max_in_flight(options.max_in_flight)
        .build()?;
    runtime.start().await?;

    let inputs = match &options.text {
        Some(_) => vec![None],
        None => read_stdin_records()?,
    };
    if inputs.is_empty() {
        eprintln!("translate_cli: no input (pass text as arguments or pipe lines on stdin)");
    }

    let output = runtime.process_all(inputs).await;
    runtime.stop().await;

    print_output(&output);
    if output.success.len() == output.total() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn parse_options(args: Vec<String>) -> Result<CliOptions, Box<dyn std::error::Error>> {
    let mut options = CliOptions {
        to_language: None,
        from_language: None,
        pretty_print_response: true,
        max_in_flight: 4,
        text: None,
    };
    let mut words = Vec::new();

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--to" => {
                let value = args
                    .get(i + 1)
                    .ok_or("missing value for --to (comma-separated language tags)")?;
                options.to_language = Some(value.clone());
                i += 2;
            }
            "--from" => {
                let value = args.get(i + 1).ok_or("missing value for --from")?;
                options.from_language = Some(value.clone());
                i += 2;
            }
            "--max-in-flight" => {
                let value = args.get(i + 1).ok_or("missing value for --max-in-flight")?;
                options.max_in_flight = value
                    .parse::<usize>()
                    .map_err(|_| "--max-in-flight must be a positive integer")?;
                i += 2;
            }
            "--no-pretty" => {
                options.pretty_print_response = false;
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown argument: {other}").into());
            }
            word => {
                words.push(word.to_string());
                i += 1;
            }
        }
    }

    if !words.is_empty() {
        options.text = Some(words.join(" "));
    }
    Ok(options)
}

fn apply_options(mut config: TranslatorConfig, options: &CliOptions) -> TranslatorConfig {
    if let Some(to_language) = &options.to_language {
        config = config.with_to_language(to_language.clone());
    }
    if let Some(from_language) = &options.from_language {
        config = config.with_from_language(from_language.clone());
    }
    let input = match &options.text {
        Some(text) => InputSource::Text(text.clone()),
        None => InputSource::Content,
    };
    config
        .with_input(input)
        .with_pretty_print_response(options.pretty_print_response)
}

fn read_stdin_records() -> io::Result<Vec<Option<Record>>> {
    let mut records = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(Some(Record::new().with_content(line)));
    }
    Ok(records)
}

fn print_output(output: &ChannelOutput) {
    for record in &output.success {
        match azure_translate::decode_translations(record.content()) {
            Ok(results) => {
                for result in results {
                    if let Some(detected) = &result.detected_language {
                        println!("(detected {} {:.2})", detected.language, detected.score);
                    }
                    for translation in result.translations {
                        println!("[{}] {}", translation.to, translation.text);
                    }
                }
            }
            Err(_) => println!("{}", String::from_utf8_lossy(record.content())),
        }
    }

    for outcome in [Outcome::TranslationFailure, Outcome::CommunicationFailure] {
        for record in output.channel(outcome) {
            eprintln!("{outcome}:");
            for (name, value) in record.attributes() {
                eprintln!("  {name}={value}");
            }
        }
    }
}

fn print_help() {
    println!(
        "translate_cli\n\n\
Usage:\n  cargo run --bin translate_cli -- [--to en,fr] [--from ru] [--no-pretty] [TEXT...]\n\n\
Without TEXT, every non-empty stdin line is translated as its own record.\n\n\
Env:\n  ACS_TRANSLATOR_TEXT_SUBSCRIPTION_KEY     required\n  \
ACS_TRANSLATOR_TEXT_SUBSCRIPTION_REGION  required\n  \
ACS_TRANSLATOR_TEXT_ENDPOINT             required (host or base URL)\n  \
ACS_TRANSLATOR_TO                        optional target tags, default en\n  \
ACS_TRANSLATOR_FROM                      optional source tag\n  \
ACS_TRANSLATOR_TIMEOUT_MS                optional request timeout\n  \
RUST_LOG                                 optional log filter\n\n\
Flags:\n  --max-in-flight <n>  concurrent requests for stdin mode (default 4)"
    );
}
