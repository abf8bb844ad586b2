use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rustlinguist_catalog::{
    parse, reconcile, serialize, Catalog, Occurrence, Translator, TsContext,
};

#[derive(Parser)]
#[command(
    name = "rustlinguist-cli",
    about = "Maintenance commands for RustLinguist translation catalogs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 檢查翻譯目錄並輸出統計。 / Validate catalogs and report completeness.
    Validate(ValidateArgs),
    /// 合併掃描結果至翻譯目錄。 / Merge scanned occurrences into a catalog.
    Update(UpdateArgs),
    /// 查詢單一翻譯字串。 / Resolve one translation for debugging.
    Query(QueryArgs),
}

#[derive(Args)]
struct ValidateArgs {
    /// 要檢查的 TS 檔案。 / TS catalog files to validate.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// 存在未完成翻譯時使程序失敗。 / Fail when unfinished entries remain.
    #[arg(long)]
    fail_on_unfinished: bool,
}

#[derive(Args)]
struct UpdateArgs {
    /// 既有的翻譯目錄。 / Catalog to update.
    #[arg(long, value_name = "TS")]
    catalog: PathBuf,

    /// 掃描器輸出的出現紀錄（JSON 陣列）。 / Scanner occurrences as a JSON array.
    #[arg(long, value_name = "JSON")]
    occurrences: PathBuf,

    /// 輸出路徑；預設為就地覆寫。 / Output path (defaults to updating in place).
    #[arg(long, value_name = "TS")]
    output: Option<PathBuf>,

    /// 捨棄保留的過時項目。 / Drop retained obsolete entries from the result.
    #[arg(long)]
    no_obsolete: bool,
}

#[derive(Args)]
struct QueryArgs {
    /// 查詢目標的翻譯目錄。 / Catalog to query.
    #[arg(long, value_name = "TS")]
    catalog: PathBuf,

    /// 訊息所屬的 context。 / Context the message belongs to.
    #[arg(long)]
    context: String,

    /// 原始字串。 / Source text of the message.
    #[arg(long)]
    source: String,

    /// 區別同文字訊息的註解。 / Disambiguating comment, when the message has one.
    #[arg(long)]
    comment: Option<String>,

    /// 位置參數，可重複指定。 / Positional argument for %N markers, repeatable.
    #[arg(long = "arg", value_name = "VALUE")]
    args: Vec<String>,

    /// 複數訊息的數量。 / Count for plural messages.
    #[arg(long)]
    count: Option<i64>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("rustlinguist-cli error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    match Cli::parse().command {
        Commands::Validate(args) => execute_validate(args),
        Commands::Update(args) => execute_update(args),
        Commands::Query(args) => execute_query(args),
    }
}

fn load_catalog(path: &PathBuf) -> Result<Catalog> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read catalog {}", path.display()))?;
    parse(&contents).with_context(|| format!("parse catalog {}", path.display()))
}

fn execute_validate(args: ValidateArgs) -> Result<()> {
    let mut total_unfinished = 0usize;
    for path in &args.files {
        let catalog = load_catalog(path)?;
        let translator = Translator::new(Arc::new(catalog));
        if translator.plural_rules().used_fallback() {
            eprintln!(
                "warning: unknown locale '{}' in {}; default plural rule in effect",
                translator.catalog().language(),
                path.display()
            );
        }

        let stats = translator.stats();
        println!(
            " - {} [{}]: {} messages in {} contexts ({} plural, {} obsolete)",
            translator.catalog().language(),
            path.display(),
            stats.messages,
            stats.contexts,
            stats.plural,
            stats.retired
        );

        let unfinished = translator.unfinished_messages();
        if !unfinished.is_empty() {
            println!("   {} unfinished entr(ies):", unfinished.len());
            for (context, message) in unfinished.iter().take(5) {
                println!("     · {context}: {:?}", message.source);
            }
            if unfinished.len() > 5 {
                println!("     · ... {} more", unfinished.len() - 5);
            }
        }
        total_unfinished += unfinished.len();
    }

    if total_unfinished > 0 && args.fail_on_unfinished {
        bail!("{total_unfinished} unfinished translation(s) detected");
    }
    Ok(())
}

fn execute_update(args: UpdateArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let raw = fs::read_to_string(&args.occurrences)
        .with_context(|| format!("read occurrences {}", args.occurrences.display()))?;
    let occurrences: Vec<Occurrence> = serde_json::from_str(&raw)
        .with_context(|| format!("parse occurrences {}", args.occurrences.display()))?;

    let mut merged = reconcile(&catalog, &occurrences);
    if args.no_obsolete {
        merged = without_retired(&merged)?;
    }

    let destination = args.output.as_ref().unwrap_or(&args.catalog);
    fs::write(destination, serialize(&merged))
        .with_context(|| format!("write catalog {}", destination.display()))?;
    println!(
        "Merged {} occurrence(s) into {} ({} messages)",
        occurrences.len(),
        destination.display(),
        merged.message_count()
    );
    Ok(())
}

fn without_retired(catalog: &Catalog) -> Result<Catalog> {
    let contexts: Vec<TsContext> = catalog
        .contexts()
        .iter()
        .map(|context| TsContext {
            name: context.name.clone(),
            messages: context
                .messages
                .iter()
                .filter(|message| !message.status.is_retired())
                .cloned()
                .collect(),
        })
        .filter(|context| !context.messages.is_empty())
        .collect();
    Catalog::from_contexts(
        catalog.language(),
        catalog.source_language().map(str::to_string),
        catalog.version(),
        catalog.extra_attributes().to_vec(),
        contexts,
    )
    .context("rebuild catalog without obsolete entries")
}

fn execute_query(args: QueryArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let translator = Translator::new(Arc::new(catalog));
    let positional: Vec<&str> = args.args.iter().map(String::as_str).collect();
    let rendered = translator
        .translate(
            &args.context,
            &args.source,
            args.comment.as_deref(),
            &positional,
            args.count,
        )
        .context("resolve translation")?;
    println!("{rendered}");
    if translator.missing_count() > 0 {
        eprintln!("note: no stored translation; showing the source text");
    }
    Ok(())
}
