use crate::infra::{load_config, open_directory, open_store, sample_candidate};
use candidate_scout::error::AppError;
use candidate_scout::workflows::candidates::{
    AppendOutcome, CandidateCardView, CandidateDirectory, CandidateId, KeyValueSlot,
    ReviewTable, ReviewView, SortDirection, SortField, SortSpec, TriageError, TriageSession,
    TriageState,
};
use clap::Args;
use std::fmt::Write as _;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

#[derive(Args, Debug, Default)]
pub(crate) struct TriageArgs {
    /// Start listing after this directory id instead of the configured one
    #[arg(long)]
    pub(crate) since: Option<u64>,
    /// Incomplete profiles tolerated before a fetch gives up
    #[arg(long)]
    pub(crate) max_skips: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Only show rows whose name, username, location or company contain this text
    #[arg(long)]
    pub(crate) filter: Option<String>,
    /// Column to sort by (name, username, location, company, id)
    #[arg(long)]
    pub(crate) sort: Option<SortField>,
    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub(crate) descending: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RemoveArgs {
    /// Directory id of the saved candidate
    pub(crate) id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriageCommand {
    Accept,
    Reject,
    Retry,
    Quit,
}

impl TriageCommand {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" | "accept" | "+" => Some(Self::Accept),
            "r" | "reject" | "-" => Some(Self::Reject),
            "t" | "try" | "retry" => Some(Self::Retry),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Decisions taken during one terminal triage run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TriageTally {
    pub(crate) accepted: usize,
    pub(crate) already_saved: usize,
    pub(crate) rejected: usize,
}

pub(crate) async fn run_triage(args: TriageArgs) -> Result<(), AppError> {
    let mut config = load_config()?;
    if let Some(since) = args.since {
        config.directory.since = since;
    }
    if let Some(max_skips) = args.max_skips {
        config.triage.max_skips = max_skips;
    }

    let directory = open_directory(&config.directory)?;
    let store = open_store(&config.storage);
    let mut session = TriageSession::new(directory, store, config.triage);

    println!("Candidate Search");
    let tally = drive_triage(&mut session, BufReader::new(tokio::io::stdin())).await?;
    println!(
        "\n{} accepted | {} already saved | {} rejected",
        tally.accepted, tally.already_saved, tally.rejected
    );
    Ok(())
}

/// Run the prompt loop until the directory is exhausted, the user quits or input ends.
pub(crate) async fn drive_triage<D, S, R>(
    session: &mut TriageSession<D, S>,
    input: R,
) -> Result<TriageTally, AppError>
where
    D: CandidateDirectory,
    S: KeyValueSlot,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut tally = TriageTally::default();
    session.activate().await;

    loop {
        print!("{}", render_state(session.state()));
        let prompt = match session.state() {
            TriageState::Ready(_) => "[a]ccept  [r]eject  [q]uit",
            TriageState::Failed(_) => "[t]ry again  [q]uit",
            TriageState::Exhausted | TriageState::Loading => return Ok(tally),
        };
        println!("{prompt}");

        let Some(line) = lines.next_line().await? else {
            return Ok(tally);
        };

        match TriageCommand::parse(&line) {
            Some(TriageCommand::Accept) => match session.accept().await {
                Ok(AppendOutcome::Appended) => tally.accepted += 1,
                Ok(AppendOutcome::AlreadySaved) => {
                    tally.already_saved += 1;
                    println!("Already saved.");
                }
                Err(TriageError::Store(err)) => {
                    warn!(error = %err, "accept not persisted");
                    println!("Could not save candidate ({err}). Decide again.");
                }
                Err(err) => println!("{err}"),
            },
            Some(TriageCommand::Reject) => match session.reject().await {
                Ok(()) => tally.rejected += 1,
                Err(err) => println!("{err}"),
            },
            Some(TriageCommand::Retry) => {
                if let Err(err) = session.retry().await {
                    println!("{err}");
                }
            }
            Some(TriageCommand::Quit) => return Ok(tally),
            None => println!("Unrecognised choice '{}'.", line.trim()),
        }
    }
}

fn render_state(state: &TriageState) -> String {
    match state {
        TriageState::Loading => "Loading candidate...\n".to_string(),
        TriageState::Ready(candidate) => render_card(&candidate.card_view()),
        TriageState::Exhausted => {
            "\nNo More Candidates Available\nThere are no more candidates to review at this time.\n"
                .to_string()
        }
        TriageState::Failed(message) => format!("\n{message}\n"),
    }
}

pub(crate) fn render_card(card: &CandidateCardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", card.display_name);
    let _ = writeln!(out, "{}", card.handle);
    if let Some(location) = &card.location {
        let _ = writeln!(out, "{location}");
    }
    if let Some(bio) = &card.bio {
        let _ = writeln!(out, "{bio}");
    }
    if let Some(company) = &card.company {
        let _ = writeln!(out, "Company: {company}");
    }
    if let Some(email) = &card.email {
        let _ = writeln!(out, "Email: {email}");
    }
    let _ = writeln!(out, "GitHub: {}", card.html_url);
    out
}

pub(crate) fn list_saved(args: ListArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let mut table = ReviewTable::open(open_store(&config.storage))?;

    if let Some(filter) = args.filter {
        table.set_filter(filter);
    }
    if let Some(field) = args.sort {
        let direction = if args.descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        table.set_sort(SortSpec::by(field, direction));
    }

    print!("{}", render_table(&table.view()));
    Ok(())
}

pub(crate) fn remove_saved(args: RemoveArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let mut table = ReviewTable::open(open_store(&config.storage))?;
    let id = CandidateId(args.id);

    if table.remove(id)? {
        println!("Removed candidate {id}.");
    } else {
        println!("No saved candidate with id {id}.");
    }
    Ok(())
}

pub(crate) fn seed_sample() -> Result<(), AppError> {
    let config = load_config()?;
    let store = open_store(&config.storage);
    let sample = sample_candidate();
    let login = sample.login.clone();

    match store.append(sample)? {
        AppendOutcome::Appended => println!("Saved sample candidate @{login}."),
        AppendOutcome::AlreadySaved => println!("Sample candidate @{login} is already saved."),
    }
    Ok(())
}

pub(crate) fn render_table(view: &ReviewView) -> String {
    let mut out = String::from("Potential Candidates\n");

    if view.rows.is_empty() {
        if view.total_saved == 0 {
            out.push_str("No Potential Candidates\nYou haven't accepted any candidates yet.\n");
        } else {
            let _ = writeln!(out, "No saved candidates match '{}'.", view.filter);
        }
        return out;
    }

    let mut headers = vec!["Id".to_string()];
    headers.extend(view.columns.iter().map(|column| match column.indicator {
        Some(arrow) => format!("{} {arrow}", column.label),
        None => column.label.to_string(),
    }));
    headers.push("Email".to_string());
    headers.push("GitHub".to_string());

    let rows: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| {
            vec![
                row.id.to_string(),
                row.name.clone(),
                row.login.clone(),
                row.location.clone(),
                row.company.clone(),
                row.email.clone(),
                row.html_url.clone(),
            ]
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|column| {
            rows.iter()
                .map(|row| row[column].chars().count())
                .chain(std::iter::once(headers[column].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    push_line(&mut out, &headers, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    let _ = writeln!(out, "{} of {} saved", rows.len(), view.total_saved);
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
