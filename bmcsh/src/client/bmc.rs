//! Client for one management controller.

use std::time::Instant;

use log::{debug, warn};

use super::outcome::Outcome;
use crate::dialect::{CommandSet, CommandStep, Operation};
use crate::error::{CommandError, DialectError, Error, Result, TransportError};
use crate::transport::{Connector, Session, SshConfig, SshConnector};

/// Client for one management controller.
///
/// Owns the target configuration, the vendor dialect, and at most one
/// authenticated session. The session is established lazily on the first
/// command, reused across commands, and dropped on transport failure so
/// the next command reconnects from scratch.
///
/// Every command path takes `&mut self`: one command is in flight per
/// controller at a time, which is all the single-threaded firmware
/// command processors can handle. Clients for different controllers are
/// fully independent.
pub struct Bmc {
    /// Target configuration.
    config: SshConfig,

    /// Vendor dialect.
    dialect: CommandSet,

    /// Session factory.
    connector: Box<dyn Connector>,

    /// Current session (None until first use, or after transport failure
    /// or close).
    session: Option<Box<dyn Session>>,
}

impl std::fmt::Debug for Bmc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bmc")
            .field("config", &self.config)
            .field("dialect", &self.dialect)
            .field("session_open", &self.session.is_some())
            .finish()
    }
}

impl Bmc {
    /// Create a client that connects over SSH.
    pub fn new(config: SshConfig, dialect: CommandSet) -> Self {
        Self::with_connector(config, dialect, Box::new(SshConnector))
    }

    /// Create a client with a custom session connector.
    pub fn with_connector(
        config: SshConfig,
        dialect: CommandSet,
        connector: Box<dyn Connector>,
    ) -> Self {
        Self {
            config,
            dialect,
            connector,
            session: None,
        }
    }

    /// Get the vendor dialect this client speaks.
    pub fn dialect(&self) -> &CommandSet {
        &self.dialect
    }

    /// Get the target configuration.
    pub fn config(&self) -> &SshConfig {
        &self.config
    }

    /// Check if a session is currently held.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Establish the session if one is not already held.
    ///
    /// Idempotent: a held session is kept as-is. On failure nothing is
    /// retained, so a later call retries from scratch. One authentication
    /// attempt per call; retry policy belongs to the caller.
    pub async fn ensure_session(&mut self) -> Result<()> {
        if self.session.is_none() {
            debug!(
                "{}: establishing session as {}",
                self.config.socket_addr(),
                self.config.username
            );
            let session = self.connector.connect(&self.config).await?;
            self.session = Some(session);
        }
        Ok(())
    }

    /// Release the session, if any.
    ///
    /// The session is dropped even when the remote disconnect fails; the
    /// error is still surfaced.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            debug!("{}: closing session", self.config.socket_addr());
            session.close().await?;
        }
        Ok(())
    }

    /// Run one command step and classify the response.
    ///
    /// A transport error invalidates the session (dropped here, so the
    /// next command reconnects) and is returned verbatim; the classifier
    /// never sees it. Otherwise the outcome carries the raw response and
    /// whichever success marker it contained.
    async fn run_step(&mut self, step: &CommandStep) -> Result<Outcome> {
        self.ensure_session().await?;
        let session = self
            .session
            .as_mut()
            .ok_or(TransportError::Disconnected)?;

        let start = Instant::now();
        match session.run(&step.command).await {
            Ok(output) => Ok(Outcome::classify(step, output, start.elapsed())),
            Err(err) => {
                warn!(
                    "{}: dropping session after transport error: {}",
                    self.config.socket_addr(),
                    err
                );
                self.session = None;
                Err(err.into())
            }
        }
    }

    /// Run an operation's command sequence with strict AND-gating.
    ///
    /// Steps run in dialect order; a step is only issued if every step
    /// before it classified as success. A failed step aborts the
    /// remainder and its raw response becomes the error. There is no
    /// rollback, so the controller is left in whatever state the last
    /// successful step produced. Returns the final step's outcome.
    ///
    /// Power-state queries classify by response content rather than
    /// success markers; use [`Bmc::is_on`] for those.
    pub async fn run(&mut self, operation: Operation) -> Result<Outcome> {
        let steps: Vec<CommandStep> = self
            .dialect
            .steps(operation)
            .map(|steps| steps.to_vec())
            .ok_or_else(|| self.unsupported(operation))?;

        let mut last = None;
        for step in &steps {
            let outcome = self.run_step(step).await?;
            if !outcome.is_success() {
                return Err(CommandError::UnexpectedResponse {
                    command: outcome.command,
                    output: outcome.output,
                }
                .into());
            }
            last = Some(outcome);
        }

        // steps() never yields an empty sequence
        last.ok_or_else(|| self.unsupported(operation))
    }

    /// Power the host on.
    pub async fn power_on(&mut self) -> Result<Outcome> {
        self.run(Operation::PowerOn).await
    }

    /// Power the host off.
    pub async fn power_off(&mut self) -> Result<Outcome> {
        self.run(Operation::PowerOff).await
    }

    /// Hard-reset the host.
    pub async fn power_cycle(&mut self) -> Result<Outcome> {
        self.run(Operation::PowerCycleHost).await
    }

    /// Reboot the management controller itself.
    pub async fn power_cycle_controller(&mut self) -> Result<Outcome> {
        self.run(Operation::PowerCycleController).await
    }

    /// Configure the host to network-boot exactly once, then hard-reset
    /// it.
    ///
    /// The sequence ends with the dialect's host power-cycle step, so
    /// success means exactly what [`Bmc::power_cycle`] success means. If
    /// an earlier leg fails, the boot flags already written stay written.
    pub async fn set_pxe_once(&mut self) -> Result<Outcome> {
        self.run(Operation::SetPxeOnce).await
    }

    /// Ask whether the host is currently powered on.
    ///
    /// The query command succeeds even when the host is off, so this
    /// searches the response content for the dialect's powered-on marker:
    /// `Ok(true)` on a verbatim match, `Ok(false)` on anything else.
    /// Powered-off is a valid outcome, not an error. Nothing is cached;
    /// every call asks the controller.
    pub async fn is_on(&mut self) -> Result<bool> {
        let step = self
            .dialect
            .steps(Operation::QueryPowerState)
            .map(|steps| steps[0].clone())
            .ok_or_else(|| self.unsupported(Operation::QueryPowerState))?;

        let marker = step.power_on_marker.clone().ok_or_else(|| {
            Error::from(CommandError::MissingPowerMarker {
                dialect: self.dialect.name.clone(),
                command: step.command.clone(),
            })
        })?;

        let outcome = self.run_step(&step).await?;
        Ok(outcome.contains(&marker))
    }

    fn unsupported(&self, operation: Operation) -> Error {
        DialectError::UnsupportedOperation {
            dialect: self.dialect.name.clone(),
            operation,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::client::BmcBuilder;
    use crate::transport::AuthMethod;

    /// Fake controller: canned command->response table plus a log of
    /// everything the client did to it.
    #[derive(Default)]
    struct FakeState {
        answers: HashMap<String, String>,
        drop_on: HashSet<String>,
        auth_failures: usize,
        connects: usize,
        commands: Vec<String>,
    }

    #[derive(Clone, Default)]
    struct FakeController(Arc<Mutex<FakeState>>);

    impl FakeController {
        fn with_answers(pairs: &[(&str, &str)]) -> Self {
            let fake = Self::default();
            {
                let mut state = fake.0.lock().unwrap();
                for (cmd, answer) in pairs {
                    state.answers.insert(cmd.to_string(), answer.to_string());
                }
            }
            fake
        }

        fn answer(&self, command: &str, answer: &str) {
            self.0
                .lock()
                .unwrap()
                .answers
                .insert(command.to_string(), answer.to_string());
        }

        fn drop_on(&self, command: &str) {
            self.0.lock().unwrap().drop_on.insert(command.to_string());
        }

        fn fail_auth_once(&self) {
            self.0.lock().unwrap().auth_failures = 1;
        }

        fn connects(&self) -> usize {
            self.0.lock().unwrap().connects
        }

        fn commands(&self) -> Vec<String> {
            self.0.lock().unwrap().commands.clone()
        }
    }

    #[async_trait]
    impl Connector for FakeController {
        async fn connect(
            &self,
            config: &SshConfig,
        ) -> std::result::Result<Box<dyn Session>, TransportError> {
            let mut state = self.0.lock().unwrap();
            state.connects += 1;
            if state.auth_failures > 0 {
                state.auth_failures -= 1;
                return Err(TransportError::AuthenticationFailed {
                    user: config.username.clone(),
                });
            }
            Ok(Box::new(FakeSession(self.0.clone())))
        }
    }

    struct FakeSession(Arc<Mutex<FakeState>>);

    #[async_trait]
    impl Session for FakeSession {
        async fn run(
            &mut self,
            command: &str,
        ) -> std::result::Result<String, TransportError> {
            let mut state = self.0.lock().unwrap();
            state.commands.push(command.to_string());
            if state.drop_on.contains(command) {
                return Err(TransportError::Disconnected);
            }
            match state.answers.get(command) {
                Some(answer) => Ok(answer.clone()),
                None => Err(TransportError::ExitStatus {
                    status: 1,
                    output: format!("answer not found for {command}"),
                }),
            }
        }

        async fn close(&mut self) -> std::result::Result<(), TransportError> {
            Ok(())
        }
    }

    fn test_config() -> SshConfig {
        SshConfig {
            host: "127.0.0.1".to_string(),
            port: 22,
            username: "admin".to_string(),
            auth: AuthMethod::None,
            timeout: Duration::from_secs(5),
            host_key_verification: Default::default(),
            known_hosts_path: None,
        }
    }

    /// The iLO simulator's canned table.
    fn ilo_fake() -> FakeController {
        FakeController::with_answers(&[
            ("power reset", "Server resetting ......."),
            ("reset /map1", "Resetting iLO"),
            ("power on", "Server powering on ......."),
            ("power off hard", "Forcing server power off ......."),
            ("power", "power: server power is currently: On"),
        ])
    }

    /// Canned racadm responses for the iDRAC8 table.
    fn idrac8_fake() -> FakeController {
        FakeController::with_answers(&[
            (
                "racadm serveraction powerup",
                "Server power operation successful",
            ),
            (
                "racadm serveraction powerdown",
                "Server power operation successful",
            ),
            (
                "racadm serveraction hardreset",
                "Server power operation successful",
            ),
            (
                "racadm racreset hard",
                "RAC reset operation initiated successfully. It may take up to a minute for the RAC to come back online again.",
            ),
            (
                "racadm serveraction powerstatus",
                "Server power status: ON",
            ),
            (
                "racadm config -g cfgServerInfo -o cfgServerBootOnce 1",
                "Object value modified successfully",
            ),
            (
                "racadm config -g cfgServerInfo -o cfgServerFirstBootDevice PXE",
                "Object value modified successfully",
            ),
        ])
    }

    fn bmc(dialect: &str, fake: &FakeController) -> Bmc {
        BmcBuilder::new("127.0.0.1")
            .username("admin")
            .dialect(dialect)
            .connector(Box::new(fake.clone()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_idrac8_power_operations_succeed() {
        let fake = idrac8_fake();
        let mut bmc = bmc("idrac8", &fake);

        let outcome = bmc.power_on().await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.matched_marker.as_deref(), Some("successful"));

        assert!(bmc.power_off().await.unwrap().is_success());
        assert!(bmc.power_cycle().await.unwrap().is_success());

        let outcome = bmc.power_cycle_controller().await.unwrap();
        assert_eq!(
            outcome.matched_marker.as_deref(),
            Some("initiated successfully"),
        );

        assert_eq!(
            fake.commands(),
            vec![
                "racadm serveraction powerup",
                "racadm serveraction powerdown",
                "racadm serveraction hardreset",
                "racadm racreset hard",
            ],
        );
    }

    #[tokio::test]
    async fn test_ilo_is_on() {
        let fake = ilo_fake();
        let mut bmc = bmc("ilo", &fake);

        assert!(bmc.is_on().await.unwrap());
        assert_eq!(fake.commands(), vec!["power"]);
    }

    #[tokio::test]
    async fn test_ilo_power_cycle_marker_mismatch() {
        // "Server resetting ......." does not contain "successful": the
        // reset reports failure and the raw line is the whole error text.
        let fake = ilo_fake();
        let mut bmc = bmc("ilo", &fake);

        let err = bmc.power_cycle().await.unwrap_err();
        assert_eq!(err.to_string(), "Server resetting .......");
        assert!(matches!(
            err,
            Error::Command(CommandError::UnexpectedResponse { .. }),
        ));
    }

    #[tokio::test]
    async fn test_ilo_controller_reset_succeeds() {
        let fake = ilo_fake();
        let mut bmc = bmc("ilo", &fake);

        let outcome = bmc.power_cycle_controller().await.unwrap();
        assert_eq!(outcome.matched_marker.as_deref(), Some("Resetting iLO"));
        assert_eq!(outcome.output, "Resetting iLO");
    }

    #[tokio::test]
    async fn test_classification_error_text_is_raw_response() {
        let fake = idrac8_fake();
        fake.answer(
            "racadm serveraction powerup",
            "ERROR: Unable to perform requested operation.",
        );
        let mut bmc = bmc("idrac8", &fake);

        let err = bmc.power_on().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "ERROR: Unable to perform requested operation.",
        );
    }

    #[tokio::test]
    async fn test_marker_matches_inside_surrounding_text() {
        let fake = idrac8_fake();
        fake.answer(
            "racadm serveraction powerup",
            "...preamble... successful ...trailer...",
        );
        let mut bmc = bmc("idrac8", &fake);

        assert!(bmc.power_on().await.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_transport_error_drops_session_and_skips_classifier() {
        let fake = idrac8_fake();
        fake.drop_on("racadm serveraction hardreset");
        let mut bmc = bmc("idrac8", &fake);

        let err = bmc.power_cycle().await.unwrap_err();
        // Transport failure, not a classification of response text
        assert!(matches!(
            err,
            Error::Transport(TransportError::Disconnected),
        ));
        assert!(!bmc.is_open());

        // The next operation reconnects from scratch
        assert!(bmc.power_on().await.unwrap().is_success());
        assert_eq!(fake.connects(), 2);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_a_transport_error() {
        // The simulator answers unknown commands with exit status 1
        let fake = idrac8_fake();
        let custom = CommandSet::new("custom").with_step(
            Operation::PowerOn,
            CommandStep::new("racadm serveraction bogus").with_success_marker("successful"),
        );
        let mut bmc = Bmc::with_connector(test_config(), custom, Box::new(fake));

        let err = bmc.power_on().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::ExitStatus { status: 1, .. }),
        ));
    }

    #[tokio::test]
    async fn test_pxe_once_failure_short_circuits() {
        let fake = idrac8_fake();
        fake.answer(
            "racadm config -g cfgServerInfo -o cfgServerBootOnce 1",
            "ERROR: Invalid object value specified.",
        );
        let mut bmc = bmc("idrac8", &fake);

        let err = bmc.set_pxe_once().await.unwrap_err();
        assert_eq!(err.to_string(), "ERROR: Invalid object value specified.");

        // Steps 2 and 3 must never have been issued
        assert_eq!(
            fake.commands(),
            vec!["racadm config -g cfgServerInfo -o cfgServerBootOnce 1"],
        );
    }

    #[tokio::test]
    async fn test_pxe_once_terminal_step_is_the_power_cycle() {
        let fake = idrac8_fake();
        let mut bmc = bmc("idrac8", &fake);

        let pxe = bmc.set_pxe_once().await.unwrap();
        assert_eq!(
            fake.commands(),
            vec![
                "racadm config -g cfgServerInfo -o cfgServerBootOnce 1",
                "racadm config -g cfgServerInfo -o cfgServerFirstBootDevice PXE",
                "racadm serveraction hardreset",
            ],
        );

        // Once the boot flags are set, the composite is exactly a
        // standalone power-cycle.
        let standalone = standalone_power_cycle(&fake).await.unwrap();
        assert_eq!(pxe.command, standalone.command);
        assert_eq!(pxe.output, standalone.output);
        assert_eq!(pxe.matched_marker, standalone.matched_marker);
    }

    #[tokio::test]
    async fn test_pxe_once_mirrors_power_cycle_failure() {
        let fake = idrac8_fake();
        fake.answer("racadm serveraction hardreset", "Server resetting .......");
        let mut bmc = bmc("idrac8", &fake);

        let pxe_err = bmc.set_pxe_once().await.unwrap_err();
        let cycle_err = standalone_power_cycle(&fake).await.unwrap_err();
        assert_eq!(pxe_err.to_string(), cycle_err.to_string());
        assert_eq!(pxe_err.to_string(), "Server resetting .......");
    }

    async fn standalone_power_cycle(fake: &FakeController) -> Result<Outcome> {
        let mut standalone = bmc("idrac8", fake);
        standalone.power_cycle().await
    }

    #[tokio::test]
    async fn test_ilo_has_no_pxe_once() {
        let fake = ilo_fake();
        let mut bmc = bmc("ilo", &fake);

        let err = bmc.set_pxe_once().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Dialect(DialectError::UnsupportedOperation {
                operation: Operation::SetPxeOnce,
                ..
            }),
        ));

        // Unsupported is decided from the table; no session, no commands
        assert_eq!(fake.connects(), 0);
        assert!(fake.commands().is_empty());
    }

    #[tokio::test]
    async fn test_is_on_is_idempotent_and_uncached() {
        let fake = idrac8_fake();
        let mut bmc = bmc("idrac8", &fake);

        assert!(bmc.is_on().await.unwrap());
        assert!(bmc.is_on().await.unwrap());

        // One command per call, one session for both
        assert_eq!(fake.commands().len(), 2);
        assert_eq!(fake.connects(), 1);
    }

    #[tokio::test]
    async fn test_is_on_powered_off_is_not_an_error() {
        let fake = idrac8_fake();
        fake.answer("racadm serveraction powerstatus", "Server power status: OFF");
        let mut bmc = bmc("idrac8", &fake);

        assert!(!bmc.is_on().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_on_requires_a_power_marker() {
        let fake = ilo_fake();
        let dialect = CommandSet::new("broken").with_step(
            Operation::QueryPowerState,
            CommandStep::new("power"),
        );
        let mut bmc = Bmc::with_connector(test_config(), dialect, Box::new(fake));

        let err = bmc.is_on().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Command(CommandError::MissingPowerMarker { .. }),
        ));
    }

    #[tokio::test]
    async fn test_session_reused_across_operations() {
        let fake = idrac8_fake();
        let mut bmc = bmc("idrac8", &fake);

        bmc.power_on().await.unwrap();
        bmc.power_cycle().await.unwrap();
        assert!(bmc.is_on().await.unwrap());

        assert_eq!(fake.connects(), 1);
    }

    #[tokio::test]
    async fn test_auth_failure_retains_nothing() {
        let fake = idrac8_fake();
        fake.fail_auth_once();
        let mut bmc = bmc("idrac8", &fake);

        let err = bmc.power_on().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::AuthenticationFailed { .. }),
        ));
        assert!(!bmc.is_open());
        assert!(fake.commands().is_empty());

        // A later call retries from scratch and succeeds
        assert!(bmc.power_on().await.unwrap().is_success());
        assert_eq!(fake.connects(), 2);
    }

    #[tokio::test]
    async fn test_close_releases_the_session() {
        let fake = idrac8_fake();
        let mut bmc = bmc("idrac8", &fake);

        bmc.power_on().await.unwrap();
        assert!(bmc.is_open());

        bmc.close().await.unwrap();
        assert!(!bmc.is_open());

        // Closing again is a no-op
        bmc.close().await.unwrap();

        bmc.power_off().await.unwrap();
        assert_eq!(fake.connects(), 2);
    }

    #[tokio::test]
    async fn test_builder_auth_method_carried() {
        let fake = idrac8_fake();
        let bmc = BmcBuilder::new("10.0.0.10")
            .username("root")
            .password("calvin")
            .dialect("idrac8")
            .connector(Box::new(fake))
            .build()
            .unwrap();

        assert_eq!(bmc.config().host, "10.0.0.10");
        assert!(matches!(bmc.config().auth, AuthMethod::Password(_)));
        assert_eq!(bmc.dialect().name, "idrac8");
    }

    #[tokio::test]
    async fn test_independent_targets_run_concurrently() {
        let fake_a = idrac8_fake();
        let fake_b = ilo_fake();
        let mut bmc_a = bmc("idrac8", &fake_a);
        let mut bmc_b = bmc("ilo", &fake_b);

        let (a, b) = tokio::join!(bmc_a.power_on(), bmc_b.is_on());
        assert!(a.unwrap().is_success());
        assert!(b.unwrap());
    }

    #[test]
    fn test_outcome_elapsed_is_populated() {
        let outcome = Outcome::classify(
            &CommandStep::new("power").with_success_marker("On"),
            "On".to_string(),
            Duration::from_millis(3),
        );
        assert_eq!(outcome.elapsed, Duration::from_millis(3));
    }
}
