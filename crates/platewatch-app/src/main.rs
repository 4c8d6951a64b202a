//! # platewatch binary
//!
//! Command-line client for plate detection and complaint triage.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use platewatch_api::Backend;
use platewatch_app::{
    AppConfig, app_version, build_backend, init_logging, load_media, open_session,
    registration_role,
};
use platewatch_auth::{AuthController, AuthGuard, AuthOutcome};
use platewatch_core::{ComplaintStatus, Notice, NoticeKind, Page};
use platewatch_session::SessionContext;
use platewatch_ui::{
    AdminTriageView, ComplaintDraft, ComplaintListView, DamageSummary, Effect, LOADING_MESSAGE,
    ListState, ResultPresenter, ResultsView, UploadMode, UploadView, VehicleLookupModal,
};

#[derive(Parser)]
#[command(name = "platewatch")]
#[command(about = "License plate detection and complaint triage client", long_about = None)]
#[command(version = app_version())]
struct Cli {
    /// API base URL
    #[arg(long, global = true, env = "PLATEWATCH_API_URL")]
    api_url: Option<String>,
    /// Backend implementation (remote or local)
    #[arg(long, global = true, env = "PLATEWATCH_BACKEND")]
    backend: Option<String>,
    /// Client state file
    #[arg(long, global = true, env = "PLATEWATCH_STATE_PATH")]
    state_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Create an administrator instead of an officer (local backend only)
        #[arg(long)]
        admin: bool,
    },
    /// Clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List complaints visible to the session
    Complaints,
    /// File a complaint for a plate
    FileComplaint {
        #[arg(long)]
        plate: String,
        #[arg(long)]
        description: String,
        /// Incident date as DD.MM.YYYY
        #[arg(long)]
        date: String,
        #[arg(long)]
        city: String,
        #[arg(long, default_value = "")]
        district: String,
        #[arg(long, default_value = "")]
        neighborhood: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    /// Administrator triage
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Analyze an image or video for plates
    Upload {
        #[arg(value_enum)]
        mode: ModeArg,
        path: PathBuf,
        /// Query the vehicle registry for every detected plate
        #[arg(long)]
        lookup: bool,
        /// Start a complaint for the first detected plate
        #[arg(long)]
        complain: bool,
    },
    /// Query the vehicle registry for a plate
    Lookup { plate: String },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Show the filtered complaint table
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Show status counters
    Stats,
    /// Show one complaint
    Show { id: i64 },
    /// Approve or reject a complaint
    Update {
        id: i64,
        #[arg(value_enum)]
        decision: DecisionArg,
        /// Note for the officer; the canned note is used when blank
        #[arg(long, default_value = "")]
        note: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Image,
    Video,
}

impl From<ModeArg> for UploadMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Image => UploadMode::Image,
            ModeArg::Video => UploadMode::Video,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Approved,
    Rejected,
}

impl From<StatusArg> for ComplaintStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => ComplaintStatus::Pending,
            StatusArg::Approved => ComplaintStatus::Approved,
            StatusArg::Rejected => ComplaintStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DecisionArg {
    Approve,
    Reject,
}

impl From<DecisionArg> for ComplaintStatus {
    fn from(decision: DecisionArg) -> Self {
        match decision {
            DecisionArg::Approve => ComplaintStatus::Approved,
            DecisionArg::Reject => ComplaintStatus::Rejected,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging().context("failed to initialize logging")?;

    let config = AppConfig::from_env()
        .and_then(|config| {
            config.with_overrides(
                cli.api_url.as_deref(),
                cli.backend.as_deref(),
                cli.state_path.clone(),
            )
        })
        .context("invalid configuration")?;
    let session = open_session(&config);
    let backend = build_backend(&config, &session).context("failed to build backend")?;

    match cli.command {
        Commands::Login { email, password } => {
            let mut auth = AuthController::new(session, backend);
            report_auth(auth.login(&email, &password))
        }
        Commands::Register {
            name,
            email,
            password,
            admin,
        } => {
            let role = registration_role(&config, admin).context("registration refused")?;
            let mut auth = AuthController::new(session, backend);
            report_auth(auth.register_as(&name, &email, &password, role))
        }
        Commands::Logout => {
            let auth = AuthController::new(session, backend);
            let page = auth.logout().context("failed to clear session")?;
            navigate(page);
            Ok(())
        }
        Commands::Whoami => whoami(session, backend),
        Commands::Complaints => list_complaints(session, backend),
        Commands::FileComplaint {
            plate,
            description,
            date,
            city,
            district,
            neighborhood,
            address,
        } => {
            require_login(&session, &backend)?;
            ComplaintListView::submit_complaint(&session, &plate)
                .context("failed to store pending plate")?;
            let mut draft =
                ComplaintDraft::from_session(&session).context("failed to load pending plate")?;
            draft.description = description;
            draft.date = date;
            draft.city = city;
            draft.district = district;
            draft.neighborhood = neighborhood;
            draft.address_detail = address;
            let effects = draft
                .submit(&session, &backend)
                .context("failed to submit complaint")?;
            apply_effects(effects)
        }
        Commands::Admin { command } => admin(session, backend, command),
        Commands::Upload {
            mode,
            path,
            lookup,
            complain,
        } => {
            require_login(&session, &backend)?;
            let options = UploadOptions { lookup, complain };
            upload(&session, backend.as_ref(), mode.into(), path, options)
        }
        Commands::Lookup { plate } => {
            require_login(&session, &backend)?;
            lookup_plate(backend.as_ref(), &plate);
            Ok(())
        }
    }
}

fn report_auth(outcome: AuthOutcome) -> anyhow::Result<()> {
    match outcome {
        AuthOutcome::Navigate(page) => {
            navigate(page);
            Ok(())
        }
        AuthOutcome::Failed(notice) => {
            print_notice(&notice);
            bail!("{}", notice.title)
        }
        AuthOutcome::Ignored => Ok(()),
    }
}

fn require_login(session: &SessionContext, backend: &Arc<dyn Backend>) -> anyhow::Result<()> {
    let auth = AuthController::new(session.clone(), Arc::clone(backend));
    match auth.check_auth().context("failed to read session")? {
        AuthGuard::Allowed(_) => Ok(()),
        AuthGuard::Redirect(page) => {
            navigate(page);
            bail!("not signed in")
        }
    }
}

fn whoami(session: SessionContext, backend: Arc<dyn Backend>) -> anyhow::Result<()> {
    let auth = AuthController::new(session, backend);
    match auth.check_auth().context("failed to read session")? {
        AuthGuard::Allowed(Some(user)) => {
            println!("{} ({:?})", user.name, user.role);
            Ok(())
        }
        AuthGuard::Allowed(None) => {
            let user = auth.profile().context("failed to fetch profile")?;
            println!("{} ({:?})", user.name, user.role);
            Ok(())
        }
        AuthGuard::Redirect(page) => {
            navigate(page);
            bail!("not signed in")
        }
    }
}

fn list_complaints(session: SessionContext, backend: Arc<dyn Backend>) -> anyhow::Result<()> {
    require_login(&session, &backend)?;
    let mut view = ComplaintListView::new(session, backend);
    println!("{LOADING_MESSAGE}");
    if let Some(page) = view.refresh() {
        navigate(page);
        bail!("session expired");
    }

    match view.state() {
        ListState::Ready(cards) => {
            for card in cards {
                println!(
                    "#{} {} {} [{}]",
                    card.id, card.plate, card.date, card.badge.text
                );
                if !card.description.is_empty() {
                    println!("    {}", card.description);
                }
                if let Some(note) = &card.note {
                    println!("    {}: {}", note.label, note.text);
                }
            }
        }
        ListState::Empty(message) | ListState::Failed(message) => println!("{message}"),
        ListState::Loading => {}
    }
    Ok(())
}

fn admin(
    session: SessionContext,
    backend: Arc<dyn Backend>,
    command: AdminCommands,
) -> anyhow::Result<()> {
    let mut view = AdminTriageView::new(session, backend);
    let effects = view.open().context("failed to evaluate admin access")?;
    if !effects.is_empty() {
        apply_effects(effects)?;
        bail!("admin access required");
    }

    match command {
        AdminCommands::List { search, status } => {
            if !search.is_empty() {
                apply_effects(view.set_text_filter(&search))?;
            }
            if let Some(status) = status {
                apply_effects(view.set_status_filter(Some(status.into())))?;
            }
            print_triage_table(&view);
            Ok(())
        }
        AdminCommands::Stats => {
            let stats = view.stats();
            println!(
                "total={} pending={} approved={} rejected={}",
                stats.total, stats.pending, stats.approved, stats.rejected
            );
            Ok(())
        }
        AdminCommands::Show { id } => {
            apply_effects(view.open_detail(id))?;
            if let Some(detail) = view.detail() {
                println!("{} [{}]", detail.plate, detail.badge.text);
                println!("Tarih: {}", detail.date);
                println!("Konum: {}", detail.location);
                println!("{}", detail.description);
                if !detail.note.is_empty() {
                    println!("Not: {}", detail.note);
                }
            }
            Ok(())
        }
        AdminCommands::Update {
            id,
            decision,
            note,
            yes,
        } => {
            let pending = view.request_status_update(id, decision.into(), &note);
            println!("{}", pending.title);
            println!("{}", pending.message);
            if yes || confirm_on_stdin().context("failed to read confirmation")? {
                apply_effects(view.confirm(pending))
            } else {
                view.cancel(pending);
                Ok(())
            }
        }
    }
}

fn print_triage_table(view: &AdminTriageView) {
    match view.table() {
        ListState::Ready(rows) => {
            for row in rows {
                println!(
                    "#{} {} {} {} [{}] {}",
                    row.id, row.date, row.plate, row.location, row.badge.text, row.description
                );
            }
        }
        ListState::Empty(message) | ListState::Failed(message) => println!("{message}"),
        ListState::Loading => println!("{LOADING_MESSAGE}"),
    }
    if let Some(info) = view.showing_info() {
        println!("{info}");
    }
}

fn confirm_on_stdin() -> io::Result<bool> {
    print!("[e/h] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "e" | "evet" | "y" | "yes"
    ))
}

struct UploadOptions {
    lookup: bool,
    complain: bool,
}

fn upload(
    session: &SessionContext,
    backend: &dyn Backend,
    mode: UploadMode,
    path: PathBuf,
    options: UploadOptions,
) -> anyhow::Result<()> {
    let file = load_media(&path).with_context(|| format!("failed to load {}", path.display()))?;
    let mut view = UploadView::new();
    view.set_mode(mode);
    if let Err(notice) = view.stage_file(file) {
        print_notice(&notice);
        bail!("{}", notice.message);
    }
    if let Some(label) = view.file_label() {
        println!("{label}");
    }

    let mut plates = Vec::new();
    let failure = view.analyze(backend, |result, _mode| {
        match ResultPresenter::present(result) {
            ResultsView::Image(image) => {
                for card in &image.cards {
                    println!(
                        "{} [{}] {}",
                        card.plate,
                        card.category.text,
                        card.city_label()
                    );
                    plates.push(card.plate.clone());
                }
                if let Some(message) = image.empty_message {
                    println!("{message}");
                }
            }
            ResultsView::Video(video) => {
                for row in &video.rows {
                    println!(
                        "#{} {} [{}] {}",
                        row.track_id, row.plate, row.category.text, row.score
                    );
                    plates.push(row.plate.clone());
                }
                if let Some(message) = video.empty_message {
                    println!("{message}");
                }
            }
        }
    });
    if let Some(notice) = failure {
        print_notice(&notice);
        bail!("{}", notice.message);
    }

    if options.lookup {
        for plate in &plates {
            lookup_plate(backend, plate);
        }
    }
    if options.complain
        && let Some(plate) = plates.first()
    {
        let page = ResultPresenter::file_complaint(session, plate)
            .context("failed to store pending plate")?;
        navigate(page);
    }
    Ok(())
}

fn lookup_plate(backend: &dyn Backend, plate: &str) {
    let mut modal = VehicleLookupModal::new();
    if let Some(notice) = modal.open(backend, plate) {
        print_notice(&notice);
        return;
    }
    let Some(card) = modal.card() else {
        return;
    };

    println!("{}", card.plate);
    if !card.title.is_empty() {
        println!("{}", card.title);
    }
    if !card.info.is_empty() {
        println!("{}", card.info);
    }
    println!("{}", card.mileage);
    if let Some(date) = &card.mileage_date {
        println!("{date}");
    }
    match &card.damage {
        DamageSummary::Damaged { headline, timeline } => {
            println!("{headline}");
            for entry in timeline {
                println!("  {} {} {}", entry.date, entry.summary, entry.cost);
            }
        }
        DamageSummary::Clean { headline } => println!("{headline}"),
    }
}

fn apply_effects(effects: Vec<Effect>) -> anyhow::Result<()> {
    let mut failed = None;
    for effect in effects {
        match effect {
            Effect::Show(notice) => {
                if notice.kind == NoticeKind::Error {
                    failed = Some(notice.message.clone());
                }
                print_notice(&notice);
            }
            Effect::Navigate(page) => {
                navigate(page);
                if page == Page::Login {
                    failed = Some("session expired".to_string());
                }
            }
        }
    }
    match failed {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}

fn print_notice(notice: &Notice) {
    let marker = match notice.kind {
        NoticeKind::Success => "ok",
        NoticeKind::Warning => "warning",
        NoticeKind::Error => "error",
    };
    eprintln!("[{marker}] {}: {}", notice.title, notice.message);
}

fn navigate(page: Page) {
    println!("-> {}", page.path());
}
