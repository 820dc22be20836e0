use crate::{
    api::InteractionFailure,
    common::{
        data::{
            ExpectedResponse, Interaction, ObservedRequest, UnexpectedReason, UnexpectedRequest,
        },
        util::Diagnostics,
    },
    server::matchers::{self, evaluate, request_matches, Evaluation, Matcher},
};
use std::sync::{Mutex, MutexGuard};

/// What the mock endpoint should answer for a received request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ServeOutcome {
    /// The request claimed the interaction at `index`.
    Matched {
        index: usize,
        response: ExpectedResponse,
    },
    /// No interaction matched. The response of the closest pending interaction is returned so
    /// the client under test keeps working; the mismatches were recorded against it.
    BestEffort {
        index: usize,
        response: ExpectedResponse,
        reason: String,
    },
    /// The request matched an interaction that had already been claimed.
    AlreadySatisfied {
        index: usize,
        response: ExpectedResponse,
    },
    /// There is no candidate interaction for this request at all.
    Unmatched { reason: String },
}

struct RegistryState {
    interactions: Vec<Interaction>,
    history: Vec<ObservedRequest>,
    unexpected: Vec<UnexpectedRequest>,
    matchers: Vec<Box<dyn Matcher + Sync + Send>>,
}

impl RegistryState {
    fn new(interactions: Vec<Interaction>) -> Self {
        Self {
            interactions,
            history: Vec::new(),
            unexpected: Vec::new(),
            matchers: matchers::all(),
        }
    }
}

pub(crate) trait Registry {
    fn serve(&self, req: &ObservedRequest) -> ServeOutcome;
    fn interactions(&self) -> Vec<Interaction>;
    fn history(&self) -> Vec<ObservedRequest>;
    fn unexpected_requests(&self) -> Vec<UnexpectedRequest>;
    fn failures(&self) -> (Vec<InteractionFailure>, Vec<UnexpectedRequest>);
}

/// Holds the interactions of one session. All state lives behind a single mutex, so claiming
/// an interaction is one atomic check-and-set with respect to concurrent requests.
pub struct InteractionRegistry {
    state: Mutex<RegistryState>,
    diagnostics: Diagnostics,
}

impl InteractionRegistry {
    pub(crate) fn new(interactions: Vec<Interaction>, diagnostics: Diagnostics) -> Self {
        Self {
            state: Mutex::new(RegistryState::new(interactions)),
            diagnostics,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RegistryState {
    /// Claims an interaction for the request or records why none could be claimed. Trace lines
    /// are collected in `trace` so that they can be emitted once the lock is released.
    fn serve(&mut self, req: &ObservedRequest, trace: &mut Vec<String>) -> ServeOutcome {
        let RegistryState {
            interactions,
            history,
            unexpected,
            matchers,
        } = self;
        let matchers: &[Box<dyn Matcher + Sync + Send>] = matchers;

        history.push(req.clone());

        trace.push(format!("received request {}", req));

        if let Some(index) = interactions
            .iter()
            .position(|i| !i.matched && request_matches(matchers, req, &i.request))
        {
            let interaction = &mut interactions[index];
            interaction.matched = true;

            trace.push(format!(
                "request {} matched interaction #{} ({})",
                req,
                index + 1,
                interaction.label()
            ));

            return ServeOutcome::Matched {
                index,
                response: interaction.response.clone(),
            };
        }

        if let Some(index) = interactions
            .iter()
            .position(|i| i.matched && request_matches(matchers, req, &i.request))
        {
            trace.push(format!(
                "request {} matches interaction #{} ({}) which was already satisfied",
                req,
                index + 1,
                interactions[index].label()
            ));

            unexpected.push(UnexpectedRequest {
                request: req.clone(),
                reason: UnexpectedReason::AlreadySatisfied { interaction: index },
            });

            return ServeOutcome::AlreadySatisfied {
                index,
                response: interactions[index].response.clone(),
            };
        }

        // Highest number of passed checks wins, the earliest registered one on a tie.
        let mut best: Option<(usize, Evaluation)> = None;
        for (index, interaction) in interactions.iter().enumerate() {
            if interaction.matched {
                continue;
            }

            let evaluation = evaluate(matchers, req, &interaction.request);
            if evaluation.disqualified {
                continue;
            }

            if best
                .as_ref()
                .map_or(true, |(_, b)| evaluation.passed > b.passed)
            {
                best = Some((index, evaluation));
            }
        }

        match best {
            Some((index, evaluation)) => {
                let interaction = &mut interactions[index];
                let reason = evaluation
                    .mismatches
                    .iter()
                    .map(|m| format!("{} mismatch", m.field))
                    .collect::<Vec<String>>()
                    .join(", ");

                for mismatch in &evaluation.mismatches {
                    trace.push(format!(
                        "request {} does not match interaction #{} ({}): {} expected '{}' but was '{}'",
                        req,
                        index + 1,
                        interaction.label(),
                        mismatch.field,
                        mismatch.expected,
                        mismatch.actual
                    ));
                }

                interaction.mismatches.extend(evaluation.mismatches);

                ServeOutcome::BestEffort {
                    index,
                    response: interaction.response.clone(),
                    reason,
                }
            }
            None => {
                trace.push(format!(
                    "request {} does not correspond to any pending interaction",
                    req
                ));

                unexpected.push(UnexpectedRequest {
                    request: req.clone(),
                    reason: UnexpectedReason::NoInteraction,
                });

                ServeOutcome::Unmatched {
                    reason: format!("No pending interaction found for request {}", req),
                }
            }
        }
    }
}

impl Registry for InteractionRegistry {
    fn serve(&self, req: &ObservedRequest) -> ServeOutcome {
        let mut trace = Vec::new();
        let outcome = self.lock().serve(req, &mut trace);

        // The sink may call back into the session, so it only runs after the lock is released.
        for line in &trace {
            self.diagnostics.emit(line);
        }

        outcome
    }

    fn interactions(&self) -> Vec<Interaction> {
        self.lock().interactions.clone()
    }

    fn history(&self) -> Vec<ObservedRequest> {
        self.lock().history.clone()
    }

    fn unexpected_requests(&self) -> Vec<UnexpectedRequest> {
        self.lock().unexpected.clone()
    }

    fn failures(&self) -> (Vec<InteractionFailure>, Vec<UnexpectedRequest>) {
        let state = self.lock();

        let failures = state
            .interactions
            .iter()
            .enumerate()
            .filter(|(_, i)| !i.matched || !i.mismatches.is_empty())
            .map(|(index, i)| InteractionFailure {
                index,
                description: i.description.clone(),
                provider_state: i.provider_state.clone(),
                request: i.request.clone(),
                matched: i.matched,
                mismatches: i.mismatches.clone(),
            })
            .collect();

        (failures, state.unexpected.clone())
    }
}
