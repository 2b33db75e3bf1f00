use std::time::{Duration, Instant};

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use api_types::{
    Category, ItemStatus, account::LoginResponse, autocomplete::AutocompleteResponse,
};

use crate::{
    client::{Client, ClientError, PhotoPart},
    config::AppConfig,
    error::{AppError, Result},
    intake::{
        form::{Field, FormStore},
        reconcile,
        staging::{StagedPhoto, StagingBuffer},
    },
    ui,
};

const TICK_RATE: Duration = Duration::from_millis(200);
const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
    pub busy: bool,
}

impl LoginState {
    fn new(email: String) -> Self {
        Self {
            email,
            password: String::new(),
            focus: LoginField::Email,
            message: None,
            busy: false,
        }
    }
}

/// Focusable controls of the register screen, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterFocus {
    PhotoPath,
    Staged,
    Form(Field),
}

const FOCUS_ORDER: [RegisterFocus; 9] = [
    RegisterFocus::PhotoPath,
    RegisterFocus::Staged,
    RegisterFocus::Form(Field::DataZnalezienia),
    RegisterFocus::Form(Field::DataPrzekazania),
    RegisterFocus::Form(Field::Kategoria),
    RegisterFocus::Form(Field::Status),
    RegisterFocus::Form(Field::AdresZnalezienia),
    RegisterFocus::Form(Field::AdresZnalezieniaOpis),
    RegisterFocus::Form(Field::Opis),
];

#[derive(Debug)]
pub struct SuccessBanner {
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct RegisterState {
    pub form: FormStore,
    pub staging: StagingBuffer,
    pub photo_input: String,
    pub staged_selected: usize,
    pub focus: RegisterFocus,
    pub analyzing: bool,
    pub submitting: bool,
    pub global_error: Option<String>,
    pub success: Option<SuccessBanner>,
}

impl RegisterState {
    fn new(today: NaiveDate) -> Self {
        Self {
            form: FormStore::new(today),
            staging: StagingBuffer::default(),
            photo_input: String::new(),
            staged_selected: 0,
            focus: RegisterFocus::PhotoPath,
            analyzing: false,
            submitting: false,
            global_error: None,
            success: None,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub login: LoginState,
    pub register: RegisterState,
    pub powiat: Option<String>,
    pub connection_ok: bool,
    pub base_url: String,
}

/// Completion of a spawned network call. The closed set of transitions
/// applied by `apply_net_event`; everything the backend can do to the UI
/// goes through here.
#[derive(Debug)]
pub enum NetEvent {
    LoginDone {
        epoch: u64,
        result: std::result::Result<LoginResponse, ClientError>,
    },
    HealthDone {
        epoch: u64,
        ok: bool,
    },
    AnalysisDone {
        epoch: u64,
        result: std::result::Result<AutocompleteResponse, ClientError>,
    },
    SubmissionDone {
        epoch: u64,
        result: std::result::Result<(), ClientError>,
    },
}

pub struct App {
    config: AppConfig,
    client: Client,
    pub state: AppState,
    net_tx: UnboundedSender<NetEvent>,
    net_rx: UnboundedReceiver<NetEvent>,
    /// Session counter. Logging out bumps it, turning completions of
    /// still-running requests into dead letters (there is no cancellation
    /// primitive; results are ignored instead).
    epoch: u64,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let (net_tx, net_rx) = mpsc::unbounded_channel();
        let today = today_in(&config.timezone);
        let state = AppState {
            screen: Screen::Login,
            login: LoginState::new(config.email.clone()),
            register: RegisterState::new(today),
            powiat: None,
            connection_ok: false,
            base_url: config.base_url.clone(),
        };

        Ok(Self {
            config,
            client,
            state,
            net_tx,
            net_rx,
            epoch: 0,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        while !self.should_quit {
            self.expire_success_banner();
            while let Ok(event) = self.net_rx.try_recv() {
                self.apply_net_event(event);
            }

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(TICK_RATE)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match ui::keymap::map_key(key) {
            ui::keymap::AppAction::Quit => {
                self.should_quit = true;
            }
            ui::keymap::AppAction::Logout => {
                if self.state.screen == Screen::Register {
                    self.logout();
                }
            }
            ui::keymap::AppAction::Cancel => self.handle_cancel(),
            ui::keymap::AppAction::Analyze => self.trigger_analysis(),
            ui::keymap::AppAction::Save => self.trigger_submission(),
            ui::keymap::AppAction::NextField => self.advance_focus(true),
            ui::keymap::AppAction::PrevField => self.advance_focus(false),
            ui::keymap::AppAction::Submit => self.handle_submit_key(),
            ui::keymap::AppAction::Backspace => self.edit_focused(None),
            ui::keymap::AppAction::Up => self.handle_vertical(true),
            ui::keymap::AppAction::Down => self.handle_vertical(false),
            ui::keymap::AppAction::Input(ch) => self.edit_focused(Some(ch)),
            ui::keymap::AppAction::None => {}
        }
    }

    fn handle_cancel(&mut self) {
        match self.state.screen {
            Screen::Login => {
                self.should_quit = true;
            }
            Screen::Register => {
                let register = &mut self.state.register;
                match register.focus {
                    // Explicit dismissal of the staged set.
                    RegisterFocus::PhotoPath | RegisterFocus::Staged => {
                        register.staging.clear();
                        register.staged_selected = 0;
                    }
                    RegisterFocus::Form(_) => {
                        register.global_error = None;
                        register.success = None;
                    }
                }
            }
        }
    }

    fn advance_focus(&mut self, forward: bool) {
        match self.state.screen {
            Screen::Login => {
                self.state.login.focus = match self.state.login.focus {
                    LoginField::Email => LoginField::Password,
                    LoginField::Password => LoginField::Email,
                };
            }
            Screen::Register => {
                let register = &mut self.state.register;
                let position = FOCUS_ORDER
                    .iter()
                    .position(|focus| *focus == register.focus)
                    .unwrap_or(0);
                let next = if forward {
                    (position + 1) % FOCUS_ORDER.len()
                } else {
                    (position + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len()
                };
                register.focus = FOCUS_ORDER[next];
            }
        }
    }

    fn handle_submit_key(&mut self) {
        match self.state.screen {
            Screen::Login => self.attempt_login(),
            Screen::Register => {
                let register = &mut self.state.register;
                match register.focus {
                    RegisterFocus::PhotoPath => {
                        let path = register.photo_input.trim().to_string();
                        if !path.is_empty() {
                            register.staging.add_path(&path);
                            register.photo_input.clear();
                        }
                    }
                    RegisterFocus::Staged => {
                        register.staging.remove_at(register.staged_selected);
                        register.staged_selected = register
                            .staged_selected
                            .min(register.staging.len().saturating_sub(1));
                    }
                    RegisterFocus::Form(Field::Kategoria) => self.cycle_category(true),
                    RegisterFocus::Form(Field::Status) => self.cycle_status(),
                    RegisterFocus::Form(_) => {}
                }
            }
        }
    }

    fn handle_vertical(&mut self, up: bool) {
        if self.state.screen != Screen::Register {
            return;
        }
        match self.state.register.focus {
            RegisterFocus::Staged => {
                let register = &mut self.state.register;
                if register.staging.is_empty() {
                    return;
                }
                register.staged_selected = if up {
                    register.staged_selected.saturating_sub(1)
                } else {
                    (register.staged_selected + 1).min(register.staging.len() - 1)
                };
            }
            RegisterFocus::Form(Field::Kategoria) => self.cycle_category(!up),
            RegisterFocus::Form(Field::Status) => self.cycle_status(),
            _ => {}
        }
    }

    fn cycle_category(&mut self, forward: bool) {
        let current = self.state.register.form.draft().kategoria;
        let position = Category::ALL
            .iter()
            .position(|category| *category == current)
            .unwrap_or(0);
        let next = if forward {
            (position + 1) % Category::ALL.len()
        } else {
            (position + Category::ALL.len() - 1) % Category::ALL.len()
        };
        self.state.register.form.set_category(Category::ALL[next]);
    }

    fn cycle_status(&mut self) {
        let next = match self.state.register.form.draft().status {
            ItemStatus::DoOdbioru => ItemStatus::Odebrano,
            ItemStatus::Odebrano => ItemStatus::DoOdbioru,
        };
        self.state.register.form.set_status(next);
    }

    /// Routes a typed character (or backspace on `None`) into the focused
    /// text buffer.
    fn edit_focused(&mut self, push: Option<char>) {
        match self.state.screen {
            Screen::Login => {
                let field = match self.state.login.focus {
                    LoginField::Email => &mut self.state.login.email,
                    LoginField::Password => &mut self.state.login.password,
                };
                match push {
                    Some(ch) => field.push(ch),
                    None => {
                        field.pop();
                    }
                }
            }
            Screen::Register => match self.state.register.focus {
                RegisterFocus::PhotoPath => {
                    let input = &mut self.state.register.photo_input;
                    match push {
                        Some(ch) => input.push(ch),
                        None => {
                            input.pop();
                        }
                    }
                }
                RegisterFocus::Form(field) if field.is_text() => {
                    let mut value = self.state.register.form.text(field).to_string();
                    match push {
                        Some(ch) => value.push(ch),
                        None => {
                            value.pop();
                        }
                    }
                    self.state.register.form.set_text(field, value);
                }
                RegisterFocus::Form(_) | RegisterFocus::Staged => {}
            },
        }
    }

    fn attempt_login(&mut self) {
        if self.state.login.busy {
            return;
        }
        let email = self.state.login.email.trim().to_string();
        let password = self.state.login.password.clone();
        if email.is_empty() || password.is_empty() {
            self.state.login.message = Some("Podaj email i hasło.".to_string());
            return;
        }

        self.state.login.busy = true;
        self.state.login.message = None;

        let client = self.client.clone();
        let tx = self.net_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = client.login(&email, &password).await;
            let _ = tx.send(NetEvent::LoginDone { epoch, result });
        });
    }

    /// Sends the staged photos for analysis. Single-flight: a second
    /// trigger while one is pending is a no-op, and an empty staging
    /// buffer makes the call a no-op by contract.
    fn trigger_analysis(&mut self) {
        if self.state.screen != Screen::Register {
            return;
        }
        let register = &mut self.state.register;
        if register.analyzing || register.staging.is_empty() {
            return;
        }
        register.analyzing = true;

        let photos = register.staging.photos().to_vec();
        let client = self.client.clone();
        let tx = self.net_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = match load_photos(&photos).await {
                Ok(parts) => client.autocomplete(parts).await,
                Err(err) => Err(err),
            };
            let _ = tx.send(NetEvent::AnalysisDone { epoch, result });
        });
    }

    /// Dispatches the record. Every attempt starts from a clean error
    /// slate; a date that does not parse fails locally without touching
    /// the network.
    fn trigger_submission(&mut self) {
        if self.state.screen != Screen::Register {
            return;
        }
        let register = &mut self.state.register;
        if register.submitting {
            return;
        }
        register.form.clear_errors();
        register.global_error = None;
        register.success = None;

        match register.form.snapshot() {
            Ok(item) => {
                register.submitting = true;
                let client = self.client.clone();
                let tx = self.net_tx.clone();
                let epoch = self.epoch;
                tokio::spawn(async move {
                    let result = client.create_item(&item).await;
                    let _ = tx.send(NetEvent::SubmissionDone { epoch, result });
                });
            }
            Err(errors) => {
                register.form.set_errors(errors);
                register.global_error = Some(reconcile::VALIDATION_BANNER.to_string());
            }
        }
    }

    fn probe_health(&self) {
        let client = self.client.clone();
        let tx = self.net_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let ok = client.health().await;
            let _ = tx.send(NetEvent::HealthDone { epoch, ok });
        });
    }

    fn logout(&mut self) {
        self.epoch += 1;
        self.state.powiat = None;
        self.state.connection_ok = false;
        self.state.register = RegisterState::new(today_in(&self.config.timezone));
        self.state.login = LoginState::new(self.config.email.clone());
        self.state.screen = Screen::Login;
    }

    fn expire_success_banner(&mut self) {
        let expired = self
            .state
            .register
            .success
            .as_ref()
            .is_some_and(|banner| Instant::now() >= banner.expires_at);
        if expired {
            self.state.register.success = None;
        }
    }

    /// The single place where network completions touch the state. Stale
    /// epochs (requests outliving a logout) are dropped unseen.
    fn apply_net_event(&mut self, event: NetEvent) {
        match event {
            NetEvent::LoginDone { epoch, result } => {
                if epoch != self.epoch {
                    return;
                }
                self.state.login.busy = false;
                match result {
                    Ok(response) => {
                        tracing::info!(powiat = %response.powiat, "logged in");
                        self.state.powiat = Some(response.powiat);
                        self.state.login.password.clear();
                        self.state.login.message = None;
                        self.state.register =
                            RegisterState::new(today_in(&self.config.timezone));
                        self.state.screen = Screen::Register;
                        self.probe_health();
                    }
                    Err(err) => {
                        self.state.login.message = Some(login_message_for_error(err));
                    }
                }
            }
            NetEvent::HealthDone { epoch, ok } => {
                if epoch == self.epoch {
                    self.state.connection_ok = ok;
                }
            }
            NetEvent::AnalysisDone { epoch, result } => {
                if epoch != self.epoch {
                    return;
                }
                let register = &mut self.state.register;
                register.analyzing = false;
                match result {
                    Ok(suggestion) => {
                        // The merge targets current field values, not a
                        // snapshot: if a submission reset the record while
                        // the analysis was in flight, the suggestion lands
                        // on the fresh draft. Accepted race.
                        register.form.merge_from_analysis(&suggestion);
                        register.staging.clear();
                        register.staged_selected = 0;
                    }
                    Err(err) => {
                        // Staged photos stay put so the officer can retry
                        // without re-selecting them.
                        register.global_error = Some(global_message_for_error(err));
                    }
                }
            }
            NetEvent::SubmissionDone { epoch, result } => {
                if epoch != self.epoch {
                    return;
                }
                let register = &mut self.state.register;
                register.submitting = false;
                match result {
                    Ok(()) => {
                        register.success = Some(SuccessBanner {
                            message: "Pomyślnie dodano do rejestru!".to_string(),
                            expires_at: Instant::now() + SUCCESS_BANNER_TTL,
                        });
                        register
                            .form
                            .reset(&[Field::DataZnalezienia, Field::DataPrzekazania]);
                    }
                    Err(ClientError::Validation(body)) => {
                        let reconciled = reconcile::reconcile(&body);
                        register.form.set_errors(reconciled.field_errors);
                        register.global_error = Some(reconciled.global);
                    }
                    Err(err) => {
                        register.global_error = Some(global_message_for_error(err));
                    }
                }
            }
        }
    }
}

async fn load_photos(photos: &[StagedPhoto]) -> std::result::Result<Vec<PhotoPart>, ClientError> {
    let mut parts = Vec::with_capacity(photos.len());
    for photo in photos {
        let bytes = tokio::fs::read(&photo.path).await.map_err(|err| {
            ClientError::File(format!(
                "Nie można odczytać pliku {}: {err}",
                photo.path.display()
            ))
        })?;
        parts.push(PhotoPart {
            file_name: photo.file_name.clone(),
            bytes,
        });
    }
    Ok(parts)
}

fn today_in(timezone: &str) -> NaiveDate {
    match timezone.parse::<chrono_tz::Tz>() {
        Ok(tz) => chrono::Utc::now().with_timezone(&tz).date_naive(),
        Err(_) => chrono::Local::now().date_naive(),
    }
}

fn login_message_for_error(err: ClientError) -> String {
    match err {
        ClientError::Unauthorized => "Błędny email lub hasło.".to_string(),
        ClientError::Transport(err) => format!("Serwer nieosiągalny: {err}"),
        ClientError::Server(message) if !message.is_empty() => format!("Błąd serwera: {message}"),
        _ => "Błąd logowania.".to_string(),
    }
}

fn global_message_for_error(err: ClientError) -> String {
    match err {
        ClientError::Transport(err) => format!("Serwer nieosiągalny: {err}"),
        ClientError::Analysis(message) => format!("Błąd AI: {message}"),
        ClientError::File(message) => message,
        ClientError::Server(message) => format!("Błąd serwera: {message}"),
        ClientError::Unauthorized => "Sesja wygasła. Zaloguj się ponownie.".to_string(),
        ClientError::Validation(body) => reconcile::reconcile(&body).global,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::item::SaveErrorBody;

    fn register_app() -> App {
        let mut app = App::new(AppConfig::default()).unwrap();
        app.state.screen = Screen::Register;
        app
    }

    #[test]
    fn submission_success_resets_all_but_dates() {
        let mut app = register_app();
        let form = &mut app.state.register.form;
        form.set_text(Field::DataZnalezienia, "2026-02-01".to_string());
        form.set_text(Field::DataPrzekazania, "2026-02-02".to_string());
        form.set_text(Field::Opis, "parasol".to_string());
        form.set_category(Category::Elektronika);
        app.state.register.submitting = true;

        app.apply_net_event(NetEvent::SubmissionDone {
            epoch: 0,
            result: Ok(()),
        });

        let register = &app.state.register;
        assert!(!register.submitting);
        assert!(register.success.is_some());
        assert_eq!(register.form.draft().data_znalezienia, "2026-02-01");
        assert_eq!(register.form.draft().data_przekazania, "2026-02-02");
        assert!(register.form.draft().opis.is_empty());
        assert_eq!(register.form.draft().kategoria, Category::Inne);
    }

    #[test]
    fn submission_failure_runs_through_the_reconciler() {
        let mut app = register_app();
        app.state.register.submitting = true;

        app.apply_net_event(NetEvent::SubmissionDone {
            epoch: 0,
            result: Err(ClientError::Validation(SaveErrorBody::Fields {
                fields: vec!["opis".to_string()],
            })),
        });

        let register = &app.state.register;
        assert!(!register.submitting);
        assert!(register.form.error(Field::Opis).is_some());
        assert_eq!(
            register.global_error.as_deref(),
            Some(reconcile::VALIDATION_BANNER)
        );
    }

    #[test]
    fn analysis_success_merges_and_clears_staging() {
        let mut app = register_app();
        app.state.register.staging.add_path("portfel.jpg");
        app.state.register.analyzing = true;

        app.apply_net_event(NetEvent::AnalysisDone {
            epoch: 0,
            result: Ok(AutocompleteResponse {
                kategoria: Some("pieniadze".to_string()),
                opis: Some("duzo pieniedzy".to_string()),
            }),
        });

        let register = &app.state.register;
        assert!(!register.analyzing);
        assert!(register.staging.is_empty());
        assert_eq!(register.form.draft().kategoria, Category::Pieniadze);
        assert_eq!(register.form.draft().opis, "duzo pieniedzy");
    }

    #[test]
    fn analysis_failure_preserves_staging() {
        let mut app = register_app();
        app.state.register.staging.add_path("a.jpg");
        app.state.register.staging.add_path("b.jpg");
        app.state.register.analyzing = true;

        app.apply_net_event(NetEvent::AnalysisDone {
            epoch: 0,
            result: Err(ClientError::Analysis("nieczytelne zdjęcie".to_string())),
        });

        let register = &app.state.register;
        assert!(!register.analyzing);
        assert_eq!(register.staging.len(), 2);
        assert!(
            register
                .global_error
                .as_deref()
                .is_some_and(|msg| msg.contains("nieczytelne zdjęcie"))
        );
    }

    #[test]
    fn analysis_landing_after_reset_merges_into_fresh_record() {
        let mut app = register_app();
        app.state.register.form.set_text(Field::Opis, "stary opis".to_string());
        app.state.register.submitting = true;
        app.state.register.analyzing = true;

        // Submission wins the race and resets the record...
        app.apply_net_event(NetEvent::SubmissionDone {
            epoch: 0,
            result: Ok(()),
        });
        assert!(app.state.register.form.draft().opis.is_empty());

        // ...then the analysis response lands on the reset draft.
        app.apply_net_event(NetEvent::AnalysisDone {
            epoch: 0,
            result: Ok(AutocompleteResponse {
                kategoria: Some("klucze".to_string()),
                opis: Some("pęk kluczy".to_string()),
            }),
        });

        assert_eq!(app.state.register.form.draft().kategoria, Category::Klucze);
        assert_eq!(app.state.register.form.draft().opis, "pęk kluczy");
    }

    #[test]
    fn stale_epoch_events_are_dropped_after_logout() {
        let mut app = register_app();
        app.state.register.analyzing = true;
        app.logout();

        app.apply_net_event(NetEvent::AnalysisDone {
            epoch: 0,
            result: Ok(AutocompleteResponse {
                kategoria: Some("klucze".to_string()),
                opis: Some("pęk kluczy".to_string()),
            }),
        });

        assert_eq!(app.state.screen, Screen::Login);
        assert_eq!(app.state.register.form.draft().kategoria, Category::Inne);
        assert!(app.state.register.form.draft().opis.is_empty());
    }

    #[test]
    fn malformed_date_fails_locally_without_submitting() {
        let mut app = register_app();
        app.state
            .register
            .form
            .set_text(Field::DataZnalezienia, "wczoraj".to_string());

        app.trigger_submission();

        let register = &app.state.register;
        assert!(!register.submitting);
        assert!(register.form.error(Field::DataZnalezienia).is_some());
        assert_eq!(
            register.global_error.as_deref(),
            Some(reconcile::VALIDATION_BANNER)
        );
    }

    #[tokio::test]
    async fn second_analysis_trigger_while_pending_is_a_no_op() {
        let mut app = register_app();
        app.state.register.staging.add_path("does-not-exist.jpg");

        app.trigger_analysis();
        assert!(app.state.register.analyzing);
        app.trigger_analysis();

        // Exactly one completion arrives: the first spawned task fails to
        // read the file; a second task would produce a second event.
        let first = tokio::time::timeout(Duration::from_secs(5), app.net_rx.recv())
            .await
            .expect("first analysis completion")
            .expect("channel open");
        app.apply_net_event(first);
        assert!(!app.state.register.analyzing);
        assert_eq!(app.state.register.staging.len(), 1);
        assert!(app.net_rx.try_recv().is_err());
    }

    #[test]
    fn submission_attempt_clears_previous_errors_first() {
        let mut app = register_app();
        app.state.register.global_error = Some("stary błąd".to_string());
        app.state.register.form.set_errors(
            [("opis".to_string(), "Błąd pola".to_string())].into(),
        );
        // Break a date so the attempt stops locally after the wipe.
        app.state
            .register
            .form
            .set_text(Field::DataPrzekazania, "x".to_string());

        app.trigger_submission();

        let register = &app.state.register;
        assert!(register.form.error(Field::Opis).is_none());
        assert!(register.form.error(Field::DataPrzekazania).is_some());
    }
}
