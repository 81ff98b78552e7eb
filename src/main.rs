//! Brandscaling: Entrepreneurial DNA quiz and tier access CLI

use anyhow::{Context, Result};
use brandscaling::access::{AccessControl, AccessRequest};
use brandscaling::config::{load_config, Config, CONFIG_FILENAME};
use brandscaling::quiz::{self, QuestionBank, QuizScorer, RetakePolicy, Submission};
use brandscaling::reporter::{ConsoleReporter, JsonReporter};
use brandscaling::results::{load_results, save_results};
use brandscaling::rpc::{run_rpc_server, RpcContext};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Brandscaling: Entrepreneurial DNA quiz scoring and tiered access control
#[derive(Parser, Debug)]
#[command(name = "brandscaling")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: search .brandscalingrc.json in current dir and parents)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for brandscaling events (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Output format as JSON
    #[arg(long, short, global = true)]
    json: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Awareness threshold override (percent)
    #[arg(long, global = true)]
    threshold: Option<u8>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one submission or a JSON array of submissions (nothing is stored)
    Score {
        /// JSON file with `{ "answers": [...] }` or an array of such objects
        file: PathBuf,

        /// Score a batch in parallel
        #[arg(long)]
        parallel: bool,

        /// Number of parallel threads (default: number of CPU cores)
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Score and store a submission for a user, applying the retake policy
    Submit {
        #[arg(long)]
        user: String,

        /// JSON file with `{ "answers": [...] }`
        file: PathBuf,
    },

    /// Show whether a user may retake the quiz
    Eligibility {
        #[arg(long)]
        user: String,
    },

    /// Show a user's latest stored result
    #[command(name = "result")]
    LatestResult {
        #[arg(long)]
        user: String,
    },

    /// Check a tier's access to a feature or a course (exit 1 if denied)
    Access {
        #[arg(long)]
        tier: String,

        /// Feature name: qna, strategyDay, events, aiAgents, boardAccess
        #[arg(long, conflicts_with = "course", required_unless_present = "course")]
        feature: Option<String>,

        /// Course id
        #[arg(long)]
        course: Option<String>,
    },

    /// List the courses a tier may view
    Courses {
        #[arg(long)]
        tier: String,
    },

    /// Validate the access configuration (exit 1 if issues are found)
    CheckConfig,

    /// Run the stdio JSON-RPC server
    Serve,

    /// Create .brandscalingrc.json with the standard settings
    Init {
        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("brandscaling={}", level)),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("brandscaling=info")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Objects built from the loaded config
struct Runtime {
    work_dir: PathBuf,
    config: Config,
    bank: QuestionBank,
    access: AccessControl,
    policy: RetakePolicy,
}

impl Runtime {
    fn load(args: &Args) -> Result<Self> {
        let work_dir = std::env::current_dir().context("Failed to get current directory")?;
        let config = load_config(&work_dir, args.config.as_deref())?.merge_with_cli(args.threshold);
        let bank = config
            .build_question_bank()
            .context("Invalid question bank in config")?;
        let access = config
            .build_access_control()
            .context("Invalid access configuration")?;
        let policy = config
            .retake_policy()
            .context("Invalid retake policy in config")?;
        Ok(Self {
            work_dir,
            config,
            bank,
            access,
            policy,
        })
    }

    fn results_path(&self) -> PathBuf {
        self.config.results_path(&self.work_dir)
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    if args.no_color {
        colored::control::set_override(false);
    }

    let console = if args.verbose {
        ConsoleReporter::new().verbose()
    } else {
        ConsoleReporter::new()
    };
    let console = if args.no_color {
        console.without_colors()
    } else {
        console
    };
    let json = JsonReporter::new().pretty();

    match &args.command {
        Commands::Score {
            file,
            parallel,
            jobs,
        } => {
            let rt = Runtime::load(&args)?;
            if let Some(jobs) = jobs {
                configure_thread_pool(*jobs);
            }
            run_score(&rt, file, *parallel, args.json, &console, &json)
        }
        Commands::Submit { user, file } => {
            let rt = Runtime::load(&args)?;
            let submission = read_submission(file)?;
            let path = rt.results_path();
            let mut store = load_results(&path)?;
            let outcome = quiz::submit(
                &mut store,
                &rt.bank,
                &rt.policy,
                user,
                &submission.answers,
                Utc::now(),
            )?;
            if outcome.stored {
                save_results(&path, &store)?;
            }
            if args.json {
                println!("{}", json.render(&outcome));
            } else {
                print!("{}", console.render_outcome(&outcome));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Eligibility { user } => {
            let rt = Runtime::load(&args)?;
            let store = load_results(&rt.results_path())?;
            let last = store.latest_for_user(user).map(|r| r.created_at);
            let eligibility = rt.policy.eligibility(last, Utc::now());
            if args.json {
                println!("{}", json.render(&eligibility));
            } else {
                print!("{}", console.render_eligibility(&eligibility));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::LatestResult { user } => {
            let rt = Runtime::load(&args)?;
            let store = load_results(&rt.results_path())?;
            let outcome = quiz::latest_result(&store, &rt.policy, user, Utc::now())
                .with_context(|| format!("No quiz results found for user '{}'", user))?;
            if args.json {
                println!("{}", json.render(&outcome));
            } else {
                print!("{}", console.render_outcome(&outcome));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Access {
            tier,
            feature,
            course,
        } => {
            let (request, subject) = match (course, feature) {
                (Some(course), _) => (AccessRequest::Course(course), format!("course '{}'", course)),
                (None, Some(feature)) => (AccessRequest::Feature(feature), feature.clone()),
                (None, None) => anyhow::bail!("one of --feature or --course is required"),
            };
            let rt = Runtime::load(&args)?;
            let decision = rt.access.check(tier, request);
            if args.json {
                println!("{}", json.render(&decision));
            } else {
                print!("{}", console.render_decision(&subject, &decision));
            }
            Ok(if decision.has_access {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Commands::Courses { tier } => {
            let rt = Runtime::load(&args)?;
            let courses = rt.access.allowed_courses_named(tier);
            if args.json {
                println!(
                    "{}",
                    json.render(&serde_json::json!({ "tier": tier, "courses": courses }))
                );
            } else {
                print!("{}", console.render_courses(tier, &courses));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckConfig => {
            let rt = Runtime::load(&args)?;
            let issues = rt.access.validate();
            if args.json {
                println!("{}", json.render(&issues));
            } else {
                print!("{}", console.render_issues(&issues));
            }
            Ok(if issues.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Commands::Serve => {
            let rt = Runtime::load(&args)?;
            let results_path = rt.results_path();
            let ctx = RpcContext::new(rt.bank, rt.access, rt.policy)
                .with_results_file(results_path)?;
            run_rpc_server(ctx)?;
            Ok(ExitCode::SUCCESS)
        }
        // Runs without loading config, so a broken config can be replaced
        Commands::Init { dir } => run_init(dir.as_deref()),
    }
}

/// Size the global rayon pool. Returns false if the pool was already built.
fn configure_thread_pool(jobs: usize) -> bool {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
    {
        Ok(()) => true,
        Err(e) => {
            warn!(jobs, error = %e, "could not configure thread pool, using the existing one");
            false
        }
    }
}

fn read_submission(file: &Path) -> Result<Submission> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read answers: {}", file.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid submission JSON: {}", file.display()))
}

fn run_score(
    rt: &Runtime,
    file: &Path,
    parallel: bool,
    as_json: bool,
    console: &ConsoleReporter,
    json: &JsonReporter,
) -> Result<ExitCode> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read answers: {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON: {}", file.display()))?;

    if !value.is_array() {
        let submission: Submission = serde_json::from_value(value)
            .with_context(|| format!("Invalid submission JSON: {}", file.display()))?;
        let result = QuizScorer::score_submitted(&rt.bank, &submission.answers)?;
        if as_json {
            println!("{}", json.render(&result));
        } else {
            print!("{}", console.render_result(&result));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let submissions: Vec<Submission> = serde_json::from_value(value)
        .with_context(|| format!("Invalid submission JSON: {}", file.display()))?;
    let answers: Vec<_> = submissions.into_iter().map(|s| s.answers).collect();
    let results = QuizScorer::score_many(&rt.bank, &answers, parallel);

    if as_json {
        println!("{}", json.render_batch(&results));
    } else {
        for (index, result) in results.iter().enumerate() {
            println!("{}", format!("Submission #{}", index + 1).as_str().bold());
            match result {
                Ok(result) => print!("{}", console.render_result(result)),
                Err(e) => println!("  {}: {}", "Rejected".red(), e),
            }
        }
    }

    Ok(if results.iter().all(|r| r.is_ok()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn run_init(dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let json = serde_json::to_string_pretty(&Config::with_defaults())?;
    std::fs::write(&config_path, json + "\n").with_context(|| {
        format!("Failed to write config to {}", config_path.display())
    })?;

    println!(
        "{}: Created {}",
        "Done".green().bold(),
        config_path.display()
    );
    Ok(ExitCode::SUCCESS)
}
