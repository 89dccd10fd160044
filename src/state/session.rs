use std::time::Instant;

use thiserror::Error;

use crate::dao::models::QuizEntity;

/// Number of candidate causes presented in round 1.
pub const ROUND_ONE_CAUSE_COUNT: usize = 10;
/// Size of the subset a player must narrow round 1 down to.
pub const ROUND_ONE_PICK_SIZE: usize = 5;

/// Phases of a single player's quiz run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Session exists but the quiz has not been entered yet.
    AwaitingStart,
    /// Narrowing ten candidate causes down to five.
    Round1,
    /// Picking the single correct cause out of the five carried over.
    Round2,
    /// Correct final answer given; the timer is stopped.
    Completed,
    /// Aborted externally by a lobby reset.
    Evicted,
}

/// Outcome of a round-1 submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Round1Outcome {
    /// The correct cause was inside the five; round 2 starts with exactly
    /// this selection, order preserved.
    Advanced { candidates: Vec<String> },
    /// The correct cause was missed; the round continues, selection intact,
    /// timer still running.
    Missed,
}

/// Outcome of a round-2 submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Round2Outcome {
    /// The final answer was correct; the run is over.
    Completed {
        /// Elapsed whole seconds from round-1 entry to this submission.
        time: u64,
        /// Explanation text carried from the quiz definition.
        explanation: String,
    },
    /// Wrong final answer; the round continues and the timer keeps running.
    Missed,
}

/// Error returned when a session action is not valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The action cannot be performed in the current phase.
    #[error("action not available in the current quiz phase")]
    WrongPhase,
    /// Round 1 submissions must contain exactly five distinct causes.
    #[error("round 1 requires exactly {expected} distinct causes (got {got})")]
    SelectionSize { expected: usize, got: usize },
    /// The cause is not among the candidates of the current round.
    #[error("`{cause}` is not a candidate in this round")]
    UnknownCause { cause: String },
}

/// Per-player two-round quiz run. Independent across players; the only
/// external influence is [`QuizSession::evict`], triggered by a lobby reset.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz_id: String,
    passage: String,
    root_causes: Vec<String>,
    correct_root_cause: String,
    explanation: String,
    phase: SessionPhase,
    /// Causes currently toggled on, in selection order.
    selection: Vec<String>,
    /// The five causes carried into round 2, set on round-1 success.
    round2_candidates: Vec<String>,
    started_at: Option<Instant>,
    final_time: Option<u64>,
}

impl QuizSession {
    /// Create a session for `quiz_id` in the awaiting-start phase.
    pub fn new(quiz_id: &str, quiz: &QuizEntity) -> Self {
        Self {
            quiz_id: quiz_id.to_string(),
            passage: quiz.passage.clone(),
            root_causes: quiz.root_causes.clone(),
            correct_root_cause: quiz.correct_root_cause.clone(),
            explanation: quiz.explanation.clone(),
            phase: SessionPhase::AwaitingStart,
            selection: Vec::new(),
            round2_candidates: Vec::new(),
            started_at: None,
            final_time: None,
        }
    }

    /// Enter round 1 and start the timer.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::AwaitingStart {
            return Err(SessionError::WrongPhase);
        }
        self.phase = SessionPhase::Round1;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Current phase of the run.
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Quiz definition id this run was started against.
    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    /// Narrative passage shown during round 1.
    pub fn passage(&self) -> &str {
        &self.passage
    }

    /// Causes currently toggled on, in selection order.
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Candidates offered by the current round: all ten causes in round 1,
    /// the carried-over five in round 2.
    pub fn candidates(&self) -> &[String] {
        match self.phase {
            SessionPhase::Round2 => &self.round2_candidates,
            _ => &self.root_causes,
        }
    }

    /// Elapsed whole seconds. Monotonically increasing while the run is
    /// active; frozen at the final time once completed.
    pub fn elapsed_seconds(&self) -> u64 {
        if let Some(time) = self.final_time {
            return time;
        }
        self.started_at
            .map(|start| start.elapsed().as_secs())
            .unwrap_or(0)
    }

    /// Toggle one cause. In round 1 the selection is capped at five members:
    /// toggling an unselected sixth cause is a silent no-op, toggling a
    /// selected cause removes it. In round 2 a new choice always replaces
    /// the previous one.
    pub fn toggle(&mut self, cause: &str) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Round1 => {
                if !self.root_causes.iter().any(|c| c == cause) {
                    return Err(SessionError::UnknownCause {
                        cause: cause.to_string(),
                    });
                }
                if let Some(index) = self.selection.iter().position(|c| c == cause) {
                    self.selection.remove(index);
                } else if self.selection.len() < ROUND_ONE_PICK_SIZE {
                    self.selection.push(cause.to_string());
                }
                Ok(())
            }
            SessionPhase::Round2 => {
                if !self.round2_candidates.iter().any(|c| c == cause) {
                    return Err(SessionError::UnknownCause {
                        cause: cause.to_string(),
                    });
                }
                self.selection = vec![cause.to_string()];
                Ok(())
            }
            _ => Err(SessionError::WrongPhase),
        }
    }

    /// Submit a round-1 selection of exactly five distinct causes.
    pub fn submit_round1(&mut self, selection: Vec<String>) -> Result<Round1Outcome, SessionError> {
        if self.phase != SessionPhase::Round1 {
            return Err(SessionError::WrongPhase);
        }
        if selection.len() != ROUND_ONE_PICK_SIZE || has_duplicates(&selection) {
            return Err(SessionError::SelectionSize {
                expected: ROUND_ONE_PICK_SIZE,
                got: selection.len(),
            });
        }
        if let Some(unknown) = selection
            .iter()
            .find(|cause| !self.root_causes.contains(cause))
        {
            return Err(SessionError::UnknownCause {
                cause: unknown.clone(),
            });
        }

        if selection.contains(&self.correct_root_cause) {
            self.round2_candidates = selection.clone();
            self.selection.clear();
            self.phase = SessionPhase::Round2;
            Ok(Round1Outcome::Advanced {
                candidates: selection,
            })
        } else {
            // Failures cost elapsed time only; the selection stays put.
            Ok(Round1Outcome::Missed)
        }
    }

    /// Submit the single round-2 choice.
    pub fn submit_round2(&mut self, choice: &str) -> Result<Round2Outcome, SessionError> {
        if self.phase != SessionPhase::Round2 {
            return Err(SessionError::WrongPhase);
        }
        if !self.round2_candidates.iter().any(|c| c == choice) {
            return Err(SessionError::UnknownCause {
                cause: choice.to_string(),
            });
        }

        if choice == self.correct_root_cause {
            let time = self.elapsed_seconds();
            self.final_time = Some(time);
            self.phase = SessionPhase::Completed;
            Ok(Round2Outcome::Completed {
                time,
                explanation: self.explanation.clone(),
            })
        } else {
            Ok(Round2Outcome::Missed)
        }
    }

    /// Abort the run from any non-terminal phase, discarding in-progress
    /// selections. A completed run stays completed.
    pub fn evict(&mut self) {
        if matches!(self.phase, SessionPhase::Completed | SessionPhase::Evicted) {
            return;
        }
        self.phase = SessionPhase::Evicted;
        self.selection.clear();
        self.round2_candidates.clear();
    }
}

fn has_duplicates(selection: &[String]) -> bool {
    selection
        .iter()
        .enumerate()
        .any(|(index, cause)| selection[..index].contains(cause))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> QuizEntity {
        QuizEntity {
            passage: "The nightly batch silently stopped.".to_string(),
            root_causes: ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            correct_root_cause: "E".to_string(),
            explanation: "The scheduler lost its lease.".to_string(),
        }
    }

    fn started_session() -> QuizSession {
        let mut session = QuizSession::new("q1", &quiz());
        session.begin().unwrap();
        session
    }

    fn select(session: &mut QuizSession, causes: &[&str]) {
        for cause in causes {
            session.toggle(cause).unwrap();
        }
    }

    #[test]
    fn begins_in_awaiting_start_with_timer_stopped() {
        let session = QuizSession::new("q1", &quiz());
        assert_eq!(*session.phase(), SessionPhase::AwaitingStart);
        assert_eq!(session.elapsed_seconds(), 0);
    }

    #[test]
    fn begin_twice_is_rejected() {
        let mut session = started_session();
        assert_eq!(session.begin(), Err(SessionError::WrongPhase));
    }

    #[test]
    fn sixth_selection_is_a_silent_no_op() {
        let mut session = started_session();
        select(&mut session, &["A", "B", "C", "D", "E"]);
        assert_eq!(session.selection().len(), 5);

        session.toggle("F").unwrap();
        assert_eq!(session.selection(), ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn toggling_a_selected_cause_removes_it() {
        let mut session = started_session();
        select(&mut session, &["A", "B", "C"]);
        session.toggle("B").unwrap();
        assert_eq!(session.selection(), ["A", "C"]);
    }

    #[test]
    fn unknown_cause_is_rejected() {
        let mut session = started_session();
        assert_eq!(
            session.toggle("Z"),
            Err(SessionError::UnknownCause {
                cause: "Z".to_string()
            })
        );
    }

    #[test]
    fn round1_requires_exactly_five_distinct_causes() {
        let mut session = started_session();
        let too_few = vec!["A".to_string(), "B".to_string()];
        assert_eq!(
            session.submit_round1(too_few),
            Err(SessionError::SelectionSize {
                expected: 5,
                got: 2
            })
        );

        let duplicated = ["A", "A", "B", "C", "D"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(
            session.submit_round1(duplicated),
            Err(SessionError::SelectionSize {
                expected: 5,
                got: 5
            })
        );
    }

    #[test]
    fn round1_miss_keeps_the_round_and_selection() {
        let mut session = started_session();
        select(&mut session, &["A", "B", "C", "D", "F"]);
        let submitted: Vec<String> = session.selection().to_vec();

        assert_eq!(session.submit_round1(submitted), Ok(Round1Outcome::Missed));
        assert_eq!(*session.phase(), SessionPhase::Round1);
        assert_eq!(session.selection(), ["A", "B", "C", "D", "F"]);
    }

    #[test]
    fn round1_success_seeds_round2_with_the_selection_in_order() {
        let mut session = started_session();
        let picks: Vec<String> = ["G", "A", "E", "B", "H"]
            .into_iter()
            .map(str::to_string)
            .collect();

        let outcome = session.submit_round1(picks.clone()).unwrap();
        assert_eq!(
            outcome,
            Round1Outcome::Advanced {
                candidates: picks.clone()
            }
        );
        assert_eq!(*session.phase(), SessionPhase::Round2);
        assert_eq!(session.candidates(), picks.as_slice());
        assert!(session.selection().is_empty());
    }

    #[test]
    fn round2_choice_replaces_the_previous_one() {
        let mut session = started_session();
        let picks = ["A", "B", "E", "G", "H"]
            .into_iter()
            .map(str::to_string)
            .collect();
        session.submit_round1(picks).unwrap();

        session.toggle("A").unwrap();
        session.toggle("G").unwrap();
        assert_eq!(session.selection(), ["G"]);
    }

    #[test]
    fn round2_rejects_causes_dropped_in_round1() {
        let mut session = started_session();
        let picks = ["A", "B", "E", "G", "H"]
            .into_iter()
            .map(str::to_string)
            .collect();
        session.submit_round1(picks).unwrap();

        assert_eq!(
            session.submit_round2("J"),
            Err(SessionError::UnknownCause {
                cause: "J".to_string()
            })
        );
    }

    #[test]
    fn full_run_with_a_round2_retry() {
        let mut session = started_session();
        select(&mut session, &["A", "B", "E", "G", "H"]);
        let submitted: Vec<String> = session.selection().to_vec();

        let outcome = session.submit_round1(submitted.clone()).unwrap();
        assert_eq!(
            outcome,
            Round1Outcome::Advanced {
                candidates: submitted
            }
        );

        // Wrong final pick: run continues, timer still live.
        assert_eq!(session.submit_round2("G"), Ok(Round2Outcome::Missed));
        assert_eq!(*session.phase(), SessionPhase::Round2);

        match session.submit_round2("E").unwrap() {
            Round2Outcome::Completed { explanation, .. } => {
                assert_eq!(explanation, "The scheduler lost its lease.");
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(*session.phase(), SessionPhase::Completed);

        // The final time is frozen.
        let frozen = session.elapsed_seconds();
        assert_eq!(session.elapsed_seconds(), frozen);
    }

    #[test]
    fn eviction_aborts_any_active_phase() {
        let mut session = started_session();
        select(&mut session, &["A", "B", "E"]);
        session.evict();
        assert_eq!(*session.phase(), SessionPhase::Evicted);
        assert!(session.selection().is_empty());

        assert_eq!(session.toggle("A"), Err(SessionError::WrongPhase));
        assert_eq!(
            session.submit_round1(vec!["A".to_string()]),
            Err(SessionError::WrongPhase)
        );
    }

    #[test]
    fn eviction_does_not_undo_a_completed_run() {
        let mut session = started_session();
        let picks = ["A", "B", "E", "G", "H"]
            .into_iter()
            .map(str::to_string)
            .collect();
        session.submit_round1(picks).unwrap();
        session.submit_round2("E").unwrap();

        session.evict();
        assert_eq!(*session.phase(), SessionPhase::Completed);
    }
}
