//! # Checkout State Machine
//!
//! The single owner of checkout state. Every external event (SDK callback,
//! user click, network answer, timer) becomes a [`Trigger`] fed through
//! [`CheckoutStateMachine::fire`], which is synchronous and total: it either
//! moves to a new state and returns the [`Effect`]s to run, or returns an
//! error and leaves the state exactly as it was.
//!
//! ```text
//! Idle ──bootstrap ok──▶ MethodsLoaded ──method selected──▶ FormPending
//!                              ▲                                │
//!                              ├──── form not ready / timeout ◀─┤
//!                              │                                ▼
//!                              │     FormReady ◀──── form ready ┘
//!                              │        │ pay
//!                              │        ▼
//!                              ├─◀─ Submitting ──created──▶ PollingStatus ──▶ Settled
//!                              │        │ created (SDK action)      ▲              │
//!                              │        ▼                          │              │
//!                              │  AwaitingSdkContinuation ─result──┘              │
//!                              │         (or SDK silent past the timeout)         │
//!                              └──────────────────── retry ◀──────────────────────┘
//! ```
//!
//! Two guards carry the payment invariants:
//! - `authorized`: set only by the pay action, consumed by the first token
//!   delivered in `Submitting`, cleared by any reselection or error.
//! - `in_flight`: set when a token is consumed, cleared when the payment
//!   settles or the submission is abandoned. At most one payment is ever
//!   in flight.
//!
//! Each consumed token opens a new submission number. Backend answers carry
//! the number of the submission they belong to, so an answer for an
//! abandoned submission can never settle a later one.

use crate::error::{CheckoutError, CheckoutResult};
use crate::payment::{CreatedPayment, PaymentRecord, PaymentStatus};
use crate::sdk::SdkErrorKind;
use crate::session::{MethodSelection, PaymentToken};
use tracing::debug;

/// Orchestration state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Not bootstrapped, or bootstrap failed
    Idle,
    /// SDK mounted, waiting for the buyer to pick a method
    MethodsLoaded,
    /// Method picked, waiting for its form to render
    FormPending { method: String },
    /// Form is interactive; pay is allowed
    FormReady { method: String },
    /// Pay clicked; waiting for the token and the backend
    Submitting { method: String },
    /// Payment created; the SDK runs its own step (3DS, redirect)
    AwaitingSdkContinuation { payment_id: String },
    /// Payment created; polling for a terminal status
    PollingStatus { payment_id: String },
    /// Terminal status observed, or polling timed out
    Settled { record: PaymentRecord },
}

impl CheckoutState {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "Idle",
            CheckoutState::MethodsLoaded => "MethodsLoaded",
            CheckoutState::FormPending { .. } => "FormPending",
            CheckoutState::FormReady { .. } => "FormReady",
            CheckoutState::Submitting { .. } => "Submitting",
            CheckoutState::AwaitingSdkContinuation { .. } => "AwaitingSdkContinuation",
            CheckoutState::PollingStatus { .. } => "PollingStatus",
            CheckoutState::Settled { .. } => "Settled",
        }
    }

    /// Payment id the state is tracking, if any
    pub fn payment_id(&self) -> Option<&str> {
        match self {
            CheckoutState::AwaitingSdkContinuation { payment_id }
            | CheckoutState::PollingStatus { payment_id } => Some(payment_id),
            CheckoutState::Settled { record } => Some(&record.id),
            _ => None,
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Named external event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    BootstrapSucceeded,
    /// Bootstrap or SDK initialization failed; fatal for this page load
    BootstrapFailed,
    MethodSelected(MethodSelection),
    /// Result of the form wait started for selection `epoch`
    FormReadiness { epoch: u64, ready: bool },
    /// Buyer clicked pay
    PayRequested,
    TokenProduced(PaymentToken),
    /// Backend accepted submission `submission`
    PaymentCreated {
        submission: u64,
        created: CreatedPayment,
    },
    /// Backend rejected or failed submission `submission`
    SubmissionFailed { submission: u64 },
    /// SDK finished its continuation step
    PaymentResult(PaymentStatus),
    /// The SDK never reported back on `payment_id`'s continuation
    ContinuationTimedOut { payment_id: String },
    /// Poller finished (terminal status or `TIMEOUT`)
    StatusResolved(PaymentRecord),
    /// SDK reported an error or an SDK call threw
    SdkFailed(SdkErrorKind),
    RetryRequested,
}

impl Trigger {
    pub fn name(&self) -> &'static str {
        match self {
            Trigger::BootstrapSucceeded => "BootstrapSucceeded",
            Trigger::BootstrapFailed => "BootstrapFailed",
            Trigger::MethodSelected(_) => "MethodSelected",
            Trigger::FormReadiness { .. } => "FormReadiness",
            Trigger::PayRequested => "PayRequested",
            Trigger::TokenProduced(_) => "TokenProduced",
            Trigger::PaymentCreated { .. } => "PaymentCreated",
            Trigger::SubmissionFailed { .. } => "SubmissionFailed",
            Trigger::PaymentResult(_) => "PaymentResult",
            Trigger::ContinuationTimedOut { .. } => "ContinuationTimedOut",
            Trigger::StatusResolved(_) => "StatusResolved",
            Trigger::SdkFailed(_) => "SdkFailed",
            Trigger::RetryRequested => "RetryRequested",
        }
    }
}

/// Work the orchestrator performs after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Wait for the form of selection `epoch`, then fire `FormReadiness`
    AwaitForm { epoch: u64 },
    /// Ask the SDK to tokenize
    StartPayment,
    /// Send the token to the backend, then fire `PaymentCreated` or
    /// `SubmissionFailed` tagged with `submission`
    SubmitPayment { submission: u64, token: PaymentToken },
    ContinuePayment,
    /// Fire `ContinuationTimedOut` if the SDK stays silent on `payment_id`
    AwaitContinuation { payment_id: String },
    /// Poll the payment, then fire `StatusResolved`
    PollStatus { payment_id: String },
    HideLoader,
}

/// The checkout state machine
#[derive(Debug)]
pub struct CheckoutStateMachine {
    state: CheckoutState,
    selection: Option<MethodSelection>,
    authorized: bool,
    in_flight: bool,
    form_epoch: u64,
    submission: u64,
}

impl Default for CheckoutStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutStateMachine {
    pub fn new() -> Self {
        Self {
            state: CheckoutState::Idle,
            selection: None,
            authorized: false,
            in_flight: false,
            form_epoch: 0,
            submission: 0,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn selection(&self) -> Option<&MethodSelection> {
        self.selection.as_ref()
    }

    /// A pay action is waiting for its token
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// A payment has been submitted and has not settled
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn form_epoch(&self) -> u64 {
        self.form_epoch
    }

    /// Number of the latest submission
    pub fn submission(&self) -> u64 {
        self.submission
    }

    /// Apply `trigger`.
    ///
    /// # Errors
    /// - `TokenIgnored` for a token no pay action authorized
    /// - `IgnoredTrigger` for any other trigger with no meaning in the
    ///   current state
    ///
    /// On error the machine is unchanged.
    pub fn fire(&mut self, trigger: Trigger) -> CheckoutResult<Vec<Effect>> {
        use CheckoutState::*;

        let from = self.state.name();
        let trigger_name = trigger.name();
        let ignored = || CheckoutError::IgnoredTrigger {
            state: from,
            trigger: trigger_name,
        };

        let effects = match (self.state.clone(), trigger) {
            (Idle, Trigger::BootstrapSucceeded) => {
                self.enter(MethodsLoaded);
                Vec::new()
            }

            (_, Trigger::BootstrapFailed) => {
                self.reset_guards();
                // any form wait still running belongs to the old page state
                self.form_epoch += 1;
                self.enter(Idle);
                Vec::new()
            }

            (MethodsLoaded | FormPending { .. } | FormReady { .. }, Trigger::MethodSelected(selection)) => {
                self.select(selection)
            }

            // reselecting before the token arrived cancels the pay intent
            (Submitting { .. }, Trigger::MethodSelected(selection)) if !self.in_flight => {
                let mut effects = vec![Effect::HideLoader];
                effects.extend(self.select(selection));
                effects
            }

            (FormPending { method }, Trigger::FormReadiness { epoch, ready })
                if epoch == self.form_epoch =>
            {
                let form_enabled = self.selection.as_ref().is_some_and(|s| s.form_enabled);
                if ready && form_enabled {
                    self.enter(FormReady { method });
                } else {
                    debug!(method = %method, ready, form_enabled, "form not usable, selection required");
                    self.selection = None;
                    self.enter(MethodsLoaded);
                }
                Vec::new()
            }

            (FormReady { method }, Trigger::PayRequested) => {
                self.authorized = true;
                self.enter(Submitting { method });
                vec![Effect::StartPayment]
            }

            (Submitting { .. }, Trigger::TokenProduced(token)) if self.authorized && !self.in_flight => {
                self.authorized = false;
                self.in_flight = true;
                self.submission += 1;
                vec![Effect::SubmitPayment {
                    submission: self.submission,
                    token,
                }]
            }

            (_, Trigger::TokenProduced(_)) => {
                let reason = if self.in_flight {
                    "a submission is already in progress".to_string()
                } else {
                    format!("no pay action authorized it in state {}", from)
                };
                return Err(CheckoutError::TokenIgnored { reason });
            }

            (Submitting { .. }, Trigger::PaymentCreated { submission, created })
                if self.in_flight && submission == self.submission =>
            {
                let payment_id = created.id;
                if created.sdk_action_required {
                    self.enter(AwaitingSdkContinuation {
                        payment_id: payment_id.clone(),
                    });
                    vec![
                        Effect::ContinuePayment,
                        Effect::HideLoader,
                        Effect::AwaitContinuation { payment_id },
                    ]
                } else {
                    self.enter(PollingStatus {
                        payment_id: payment_id.clone(),
                    });
                    vec![Effect::HideLoader, Effect::PollStatus { payment_id }]
                }
            }

            (Submitting { .. }, Trigger::SubmissionFailed { submission })
                if self.in_flight && submission == self.submission =>
            {
                self.abandon_submission()
            }

            (AwaitingSdkContinuation { payment_id }, Trigger::PaymentResult(status)) => {
                debug!(payment_id = %payment_id, sdk_status = %status, "SDK continuation finished");
                self.enter(PollingStatus {
                    payment_id: payment_id.clone(),
                });
                vec![Effect::HideLoader, Effect::PollStatus { payment_id }]
            }

            // the vendor never signalled completion; the provider still knows
            (AwaitingSdkContinuation { payment_id }, Trigger::ContinuationTimedOut { payment_id: timed_out })
                if timed_out == payment_id =>
            {
                debug!(payment_id = %payment_id, "no SDK result, falling back to polling");
                self.enter(PollingStatus {
                    payment_id: payment_id.clone(),
                });
                vec![Effect::HideLoader, Effect::PollStatus { payment_id }]
            }

            (PollingStatus { payment_id }, Trigger::StatusResolved(record))
                if record.id == payment_id =>
            {
                self.reset_guards();
                self.enter(Settled { record });
                vec![Effect::HideLoader]
            }

            (
                Submitting { .. } | AwaitingSdkContinuation { .. } | PollingStatus { .. },
                Trigger::SdkFailed(_),
            ) => self.abandon_submission(),

            // pay raced the form render; the buyer has to pick the method again
            (FormReady { .. }, Trigger::SdkFailed(SdkErrorKind::FormElementMissing)) => {
                self.reset_guards();
                self.enter(MethodsLoaded);
                vec![Effect::HideLoader]
            }

            (MethodsLoaded | FormPending { .. } | FormReady { .. }, Trigger::SdkFailed(_)) => {
                self.authorized = false;
                vec![Effect::HideLoader]
            }

            (Settled { .. }, Trigger::RetryRequested) => {
                self.reset_guards();
                self.enter(MethodsLoaded);
                Vec::new()
            }

            _ => return Err(ignored()),
        };

        Ok(effects)
    }

    fn select(&mut self, selection: MethodSelection) -> Vec<Effect> {
        self.authorized = false;
        self.form_epoch += 1;
        let method = selection.method_type.clone();
        self.selection = Some(selection);
        self.enter(CheckoutState::FormPending { method });
        vec![Effect::AwaitForm {
            epoch: self.form_epoch,
        }]
    }

    fn abandon_submission(&mut self) -> Vec<Effect> {
        self.reset_guards();
        self.enter(CheckoutState::MethodsLoaded);
        vec![Effect::HideLoader]
    }

    fn reset_guards(&mut self) {
        self.authorized = false;
        self.in_flight = false;
        self.selection = None;
    }

    fn enter(&mut self, next: CheckoutState) {
        debug!(from = self.state.name(), to = next.name(), "checkout transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> MethodSelection {
        MethodSelection::new("CARD", true)
    }

    fn token(s: &str) -> PaymentToken {
        PaymentToken::new(s)
    }

    fn created(submission: u64, payment: CreatedPayment) -> Trigger {
        Trigger::PaymentCreated {
            submission,
            created: payment,
        }
    }

    /// Machine in `FormReady` for CARD
    fn form_ready() -> CheckoutStateMachine {
        let mut machine = CheckoutStateMachine::new();
        machine.fire(Trigger::BootstrapSucceeded).unwrap();
        machine.fire(Trigger::MethodSelected(card())).unwrap();
        let epoch = machine.form_epoch();
        machine
            .fire(Trigger::FormReadiness { epoch, ready: true })
            .unwrap();
        machine
    }

    /// Machine in `Submitting` with its token consumed
    fn submitted() -> CheckoutStateMachine {
        let mut machine = form_ready();
        machine.fire(Trigger::PayRequested).unwrap();
        machine.fire(Trigger::TokenProduced(token("ott_1"))).unwrap();
        machine
    }

    #[test]
    fn test_happy_path_to_settled() {
        let mut machine = CheckoutStateMachine::new();
        assert!(machine.fire(Trigger::BootstrapSucceeded).unwrap().is_empty());
        assert_eq!(machine.state(), &CheckoutState::MethodsLoaded);

        let effects = machine.fire(Trigger::MethodSelected(card())).unwrap();
        assert_eq!(effects, vec![Effect::AwaitForm { epoch: 1 }]);

        machine
            .fire(Trigger::FormReadiness {
                epoch: 1,
                ready: true,
            })
            .unwrap();
        assert_eq!(
            machine.state(),
            &CheckoutState::FormReady {
                method: "CARD".into()
            }
        );

        assert_eq!(
            machine.fire(Trigger::PayRequested).unwrap(),
            vec![Effect::StartPayment]
        );
        assert!(machine.is_authorized());

        let effects = machine.fire(Trigger::TokenProduced(token("ott_1"))).unwrap();
        assert_eq!(
            effects,
            vec![Effect::SubmitPayment {
                submission: 1,
                token: token("ott_1")
            }]
        );
        assert!(!machine.is_authorized());
        assert!(machine.is_in_flight());

        let effects = machine
            .fire(created(1, CreatedPayment::new("pay_1")))
            .unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::HideLoader,
                Effect::PollStatus {
                    payment_id: "pay_1".into()
                }
            ]
        );

        let record = PaymentRecord::new("pay_1", PaymentStatus::Succeeded);
        machine
            .fire(Trigger::StatusResolved(record.clone()))
            .unwrap();
        assert_eq!(machine.state(), &CheckoutState::Settled { record });
        assert!(!machine.is_in_flight());
    }

    #[test]
    fn test_token_without_pay_action_is_ignored() {
        let mut machine = CheckoutStateMachine::new();
        let err = machine.fire(Trigger::TokenProduced(token("early"))).unwrap_err();
        assert!(matches!(err, CheckoutError::TokenIgnored { .. }));
        assert_eq!(machine.state(), &CheckoutState::Idle);

        let mut machine = form_ready();
        let err = machine.fire(Trigger::TokenProduced(token("early"))).unwrap_err();
        assert!(matches!(err, CheckoutError::TokenIgnored { .. }));
        assert_eq!(machine.state().name(), "FormReady");
    }

    #[test]
    fn test_second_click_and_duplicate_token_are_ignored() {
        let mut machine = form_ready();
        machine.fire(Trigger::PayRequested).unwrap();

        let err = machine.fire(Trigger::PayRequested).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::IgnoredTrigger {
                state: "Submitting",
                trigger: "PayRequested"
            }
        );

        machine.fire(Trigger::TokenProduced(token("ott_1"))).unwrap();
        let err = machine.fire(Trigger::TokenProduced(token("ott_2"))).unwrap_err();
        assert!(matches!(err, CheckoutError::TokenIgnored { .. }));
    }

    #[test]
    fn test_form_not_ready_returns_to_methods() {
        let mut machine = CheckoutStateMachine::new();
        machine.fire(Trigger::BootstrapSucceeded).unwrap();
        machine.fire(Trigger::MethodSelected(card())).unwrap();

        machine
            .fire(Trigger::FormReadiness {
                epoch: 1,
                ready: false,
            })
            .unwrap();
        assert_eq!(machine.state(), &CheckoutState::MethodsLoaded);
        assert!(machine.fire(Trigger::PayRequested).is_err());
    }

    #[test]
    fn test_method_without_form_never_enables_pay() {
        let mut machine = CheckoutStateMachine::new();
        machine.fire(Trigger::BootstrapSucceeded).unwrap();
        machine
            .fire(Trigger::MethodSelected(MethodSelection::new("PSE", false)))
            .unwrap();

        machine
            .fire(Trigger::FormReadiness {
                epoch: 1,
                ready: true,
            })
            .unwrap();
        assert_eq!(machine.state(), &CheckoutState::MethodsLoaded);
    }

    #[test]
    fn test_stale_form_result_is_ignored() {
        let mut machine = CheckoutStateMachine::new();
        machine.fire(Trigger::BootstrapSucceeded).unwrap();
        machine.fire(Trigger::MethodSelected(card())).unwrap();
        machine
            .fire(Trigger::MethodSelected(MethodSelection::new("NEQUI", true)))
            .unwrap();
        assert_eq!(machine.form_epoch(), 2);

        let err = machine
            .fire(Trigger::FormReadiness {
                epoch: 1,
                ready: false,
            })
            .unwrap_err();
        assert!(matches!(err, CheckoutError::IgnoredTrigger { .. }));
        assert_eq!(
            machine.state(),
            &CheckoutState::FormPending {
                method: "NEQUI".into()
            }
        );
    }

    #[test]
    fn test_reselect_resets_authorization() {
        let mut machine = form_ready();
        machine.fire(Trigger::PayRequested).unwrap();

        let effects = machine.fire(Trigger::MethodSelected(card())).unwrap();
        assert_eq!(effects[0], Effect::HideLoader);
        assert!(!machine.is_authorized());
        assert_eq!(machine.state().name(), "FormPending");

        // token for the cancelled intent
        assert!(machine.fire(Trigger::TokenProduced(token("late"))).is_err());
    }

    #[test]
    fn test_no_reselect_while_payment_in_flight() {
        let mut machine = submitted();
        assert!(machine.fire(Trigger::MethodSelected(card())).is_err());
        assert!(machine.is_in_flight());
    }

    #[test]
    fn test_sdk_continuation_path() {
        let mut machine = submitted();
        let effects = machine
            .fire(created(1, CreatedPayment::new("pay_7").requiring_sdk_action()))
            .unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::ContinuePayment,
                Effect::HideLoader,
                Effect::AwaitContinuation {
                    payment_id: "pay_7".into()
                }
            ]
        );
        assert_eq!(machine.state().payment_id(), Some("pay_7"));

        let effects = machine
            .fire(Trigger::PaymentResult(PaymentStatus::Succeeded))
            .unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::HideLoader,
                Effect::PollStatus {
                    payment_id: "pay_7".into()
                }
            ]
        );
    }

    #[test]
    fn test_submission_failure_recovers() {
        let mut machine = submitted();
        assert_eq!(
            machine
                .fire(Trigger::SubmissionFailed { submission: 1 })
                .unwrap(),
            vec![Effect::HideLoader]
        );
        assert_eq!(machine.state(), &CheckoutState::MethodsLoaded);
        assert!(!machine.is_in_flight());

        // a fresh selection brings pay back
        machine.fire(Trigger::MethodSelected(card())).unwrap();
        let epoch = machine.form_epoch();
        machine
            .fire(Trigger::FormReadiness { epoch, ready: true })
            .unwrap();
        assert!(machine.fire(Trigger::PayRequested).is_ok());
    }

    #[test]
    fn test_sdk_error_while_polling_resets() {
        let mut machine = submitted();
        machine
            .fire(created(1, CreatedPayment::new("pay_1")))
            .unwrap();

        machine.fire(Trigger::SdkFailed(SdkErrorKind::Other)).unwrap();
        assert_eq!(machine.state(), &CheckoutState::MethodsLoaded);

        // the abandoned poll reports back later
        let late = PaymentRecord::new("pay_1", PaymentStatus::Succeeded);
        assert!(machine.fire(Trigger::StatusResolved(late)).is_err());
        assert_eq!(machine.state(), &CheckoutState::MethodsLoaded);
    }

    #[test]
    fn test_form_element_missing_requires_reselect() {
        let mut machine = form_ready();
        machine
            .fire(Trigger::SdkFailed(SdkErrorKind::FormElementMissing))
            .unwrap();
        assert_eq!(machine.state(), &CheckoutState::MethodsLoaded);

        let mut machine = form_ready();
        machine.fire(Trigger::SdkFailed(SdkErrorKind::Other)).unwrap();
        assert_eq!(machine.state().name(), "FormReady");
    }

    #[test]
    fn test_status_for_other_payment_is_ignored() {
        let mut machine = submitted();
        machine
            .fire(created(1, CreatedPayment::new("pay_1")))
            .unwrap();

        let other = PaymentRecord::new("pay_0", PaymentStatus::Declined);
        assert!(machine.fire(Trigger::StatusResolved(other)).is_err());
        assert_eq!(machine.state().name(), "PollingStatus");
    }

    #[test]
    fn test_retry_after_timeout() {
        let mut machine = submitted();
        machine
            .fire(created(1, CreatedPayment::new("pay_1")))
            .unwrap();
        machine
            .fire(Trigger::StatusResolved(PaymentRecord::timed_out("pay_1")))
            .unwrap();
        assert_eq!(machine.state().name(), "Settled");

        machine.fire(Trigger::RetryRequested).unwrap();
        assert_eq!(machine.state(), &CheckoutState::MethodsLoaded);
        assert!(machine.fire(Trigger::RetryRequested).is_err());
    }

    #[test]
    fn test_bootstrap_failure_from_any_state() {
        let mut machine = submitted();
        machine.fire(Trigger::BootstrapFailed).unwrap();

        assert_eq!(machine.state(), &CheckoutState::Idle);
        assert!(!machine.is_in_flight());
        assert!(!machine.is_authorized());
        assert!(machine.fire(Trigger::PayRequested).is_err());
    }

    #[test]
    fn test_late_payment_created_is_ignored() {
        let mut machine = submitted();
        machine
            .fire(Trigger::SubmissionFailed { submission: 1 })
            .unwrap();

        let err = machine
            .fire(created(1, CreatedPayment::new("pay_late")))
            .unwrap_err();
        assert_eq!(
            err,
            CheckoutError::IgnoredTrigger {
                state: "MethodsLoaded",
                trigger: "PaymentCreated"
            }
        );
    }

    #[test]
    fn test_answer_for_abandoned_submission_is_ignored() {
        let mut machine = submitted();
        machine.fire(Trigger::SdkFailed(SdkErrorKind::Other)).unwrap();

        // pay again before the first backend answer lands
        machine.fire(Trigger::MethodSelected(card())).unwrap();
        let epoch = machine.form_epoch();
        machine
            .fire(Trigger::FormReadiness { epoch, ready: true })
            .unwrap();
        machine.fire(Trigger::PayRequested).unwrap();
        machine.fire(Trigger::TokenProduced(token("ott_2"))).unwrap();
        assert_eq!(machine.submission(), 2);

        assert!(machine
            .fire(created(1, CreatedPayment::new("pay_abandoned")))
            .is_err());
        assert!(machine
            .fire(Trigger::SubmissionFailed { submission: 1 })
            .is_err());
        assert_eq!(machine.state().name(), "Submitting");
        assert!(machine.is_in_flight());

        machine
            .fire(created(2, CreatedPayment::new("pay_current")))
            .unwrap();
        assert_eq!(machine.state().payment_id(), Some("pay_current"));
    }

    #[test]
    fn test_silent_continuation_falls_back_to_polling() {
        let mut machine = submitted();
        machine
            .fire(created(1, CreatedPayment::new("pay_7").requiring_sdk_action()))
            .unwrap();

        let other = Trigger::ContinuationTimedOut {
            payment_id: "pay_6".into(),
        };
        assert!(machine.fire(other).is_err());
        assert_eq!(machine.state().name(), "AwaitingSdkContinuation");

        let effects = machine
            .fire(Trigger::ContinuationTimedOut {
                payment_id: "pay_7".into(),
            })
            .unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::HideLoader,
                Effect::PollStatus {
                    payment_id: "pay_7".into()
                }
            ]
        );

        // the SDK waking up afterwards does not start a second poll
        assert!(machine
            .fire(Trigger::PaymentResult(PaymentStatus::Succeeded))
            .is_err());
    }
}
