use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use placement_match::error::AppError;
use placement_match::matching::PairScoreRequest;

#[derive(Parser, Debug)]
#[command(
    name = "Placement Match",
    about = "Rank campus drive candidates and manage shortlist decisions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score one candidate against a job description and print the breakdown as JSON
    Score(ScoreArgs),
    /// Seed sample data, rank a drive, and walk through a shortlist decision
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Job description text
    #[arg(long)]
    pub(crate) job_description: String,
    /// Required skills, comma separated
    #[arg(long, value_delimiter = ',')]
    pub(crate) skills: Vec<String>,
    /// Candidate skills, comma separated
    #[arg(long, value_delimiter = ',')]
    pub(crate) candidate_skills: Vec<String>,
    /// Resume text
    #[arg(long, default_value = "")]
    pub(crate) resume_text: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => {
            run_score(args);
            Ok(())
        }
        Command::Demo(args) => run_demo(args).await,
    }
}

fn run_score(args: ScoreArgs) {
    let request = PairScoreRequest {
        job_description: args.job_description,
        required_skills: args.skills,
        candidate_skills: args.candidate_skills,
        resume_text: args.resume_text,
    };

    match serde_json::to_string_pretty(&request.score()) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("Score unavailable: {}", err),
    }
}
