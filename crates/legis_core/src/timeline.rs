//! Folding raw stage lists into timeline nodes.
//!
//! The upstream stage list is noisy: every clarification, referral and
//! sub-step is its own entry. Major events (readings, senate votes,
//! presidential action, publication, rejection) always stand alone; the
//! stages between two of them are folded into one node represented by
//! the last stage of the run.

use crate::classify::StageClassifier;
use crate::dates::parse_timestamp;
use crate::schema::{
    ProcessRecord, RawPrintRecord, RawStageEvent, RawVotingRecord, StageStatus, SymbolShape,
    TimelineNode, VotingResult,
};
use crate::vocabulary::{Vocabulary, contains_any};
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::{debug, warn};

const SHORT_NAME_LIMIT: usize = 30;
const SHORT_NAME_KEEP: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessOutcome {
    pub is_finished: bool,
    pub is_rejected: bool,
}

impl ProcessOutcome {
    /// The record's own flags where present, else those read off its stages.
    pub fn of(process: &ProcessRecord, vocabulary: &Vocabulary) -> Self {
        let derived = process_outcome(&process.stages, vocabulary);
        Self {
            is_finished: process.is_finished.unwrap_or(derived.is_finished),
            is_rejected: process.is_rejected.unwrap_or(derived.is_rejected),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        !self.is_finished && !self.is_rejected
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimelineBuilder<'v> {
    classifier: StageClassifier<'v>,
}

impl Default for TimelineBuilder<'static> {
    fn default() -> Self {
        Self::new(Vocabulary::polish())
    }
}

impl<'v> TimelineBuilder<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self {
            classifier: StageClassifier::new(vocabulary),
        }
    }

    pub fn classifier(&self) -> &StageClassifier<'v> {
        &self.classifier
    }

    /// Builds the timeline of a fetched process, deriving the finished and
    /// rejected flags from its stages when the record does not carry them.
    pub fn build_process(&self, process: &ProcessRecord) -> Vec<TimelineNode> {
        let outcome = ProcessOutcome::of(process, self.classifier.vocabulary());
        self.build(
            &process.stages,
            &process.votings,
            &process.prints,
            outcome.is_finished,
            outcome.is_rejected,
        )
    }

    pub fn build(
        &self,
        stages: &[RawStageEvent],
        votings: &[RawVotingRecord],
        prints: &[RawPrintRecord],
        is_finished: bool,
        is_rejected: bool,
    ) -> Vec<TimelineNode> {
        let mut nodes = Vec::new();
        if stages.is_empty() {
            return nodes;
        }

        let mut group_start = 0;
        for (index, stage) in stages.iter().enumerate() {
            if !self.classifier.is_major_event(&stage.stage_name) {
                continue;
            }
            if group_start < index {
                nodes.extend(self.map_stages_to_node(stages, group_start..index, votings, prints));
            }
            debug!(stage = %stage.stage_name, "major event");
            nodes.extend(self.map_stages_to_node(stages, index..index + 1, votings, prints));
            group_start = index + 1;
        }
        if group_start < stages.len() {
            let rest = group_start..stages.len();
            nodes.extend(self.map_stages_to_node(stages, rest, votings, prints));
        }

        let outcome = ProcessOutcome {
            is_finished,
            is_rejected,
        };
        if outcome.is_in_progress() {
            if let Some(last) = nodes.last_mut() {
                last.status = StageStatus::Current;
            }
        }

        debug!(stages = stages.len(), nodes = nodes.len(), "built timeline");
        nodes
    }

    /// Maps the run `stages[range]` onto a node. The last stage of the run names it.
    fn map_stages_to_node(
        &self,
        stages: &[RawStageEvent],
        range: Range<usize>,
        votings: &[RawVotingRecord],
        prints: &[RawPrintRecord],
    ) -> Option<TimelineNode> {
        let position = range.end;
        let group = stages.get(range)?;
        let main = group.last()?;
        let name = main.stage_name.clone();
        let (mut shape, institution) = self.classifier.classify(&name);

        let mut dates: Vec<&str> = group.iter().filter_map(RawStageEvent::date_str).collect();
        for date in dates.iter().copied().filter(|date| parse_timestamp(date).is_none()) {
            warn!(stage = %name, date, "stage date is not ISO-8601");
        }
        dates.sort_unstable();
        let date_start = dates.first().map(|d| d.to_string()).unwrap_or_default();
        let date_end = dates.last().map(|d| d.to_string()).unwrap_or_default();

        let voting_result = representative_voting(group, votings).map(VotingResult::from);
        if voting_result.is_some() && shape != SymbolShape::CircleX {
            shape = SymbolShape::Diamond;
        }

        let text = group
            .iter()
            .map(|stage| {
                format!("{} {}", stage.stage_name, stage.comment.as_deref().unwrap_or(""))
            })
            .collect::<Vec<_>>()
            .join(" ");
        let print_number = self.classifier.print_number(&text);
        let reference = &self.classifier.vocabulary().document_reference;
        let document_number = print_number.map(|number| reference.format(number));
        let document_title = print_number.and_then(|number| {
            let print = prints.iter().find(|print| print.number == number);
            if print.is_none() {
                debug!(print = number, "referenced print not among fetched prints");
            }
            print.map(|print| print.title.clone())
        });

        let mut comments: Vec<&str> = Vec::new();
        for comment in group.iter().filter_map(RawStageEvent::comment_str) {
            if !comments.contains(&comment) {
                comments.push(comment);
            }
        }

        Some(TimelineNode {
            id: format!("node-{}", main.identity(position)),
            short_name: short_name(&name),
            name,
            description: comments.join("; "),
            date_start,
            date_end,
            shape,
            institution,
            status: StageStatus::Completed,
            voting_result,
            document_number,
            document_title,
            alternatives: Vec::new(),
        })
    }
}

/// Builds a timeline with the built-in vocabulary.
pub fn build_timeline(
    stages: &[RawStageEvent],
    votings: &[RawVotingRecord],
    prints: &[RawPrintRecord],
    is_finished: bool,
    is_rejected: bool,
) -> Vec<TimelineNode> {
    TimelineBuilder::default().build(stages, votings, prints, is_finished, is_rejected)
}

/// Reads the outcome of a process off its last stage.
pub fn process_outcome(stages: &[RawStageEvent], vocabulary: &Vocabulary) -> ProcessOutcome {
    let Some(last) = stages.last() else {
        return ProcessOutcome::default();
    };
    let name = last.stage_name.to_lowercase();
    let decision = last.decision.as_deref().unwrap_or("").to_lowercase();
    let markers = &vocabulary.outcome;
    ProcessOutcome {
        is_finished: contains_any(&name, &markers.finished),
        is_rejected: contains_any(&name, &markers.rejected)
            || contains_any(&decision, &markers.rejected),
    }
}

/// Names longer than 30 characters keep their first 28 and gain an ellipsis.
pub fn short_name(name: &str) -> String {
    if name.chars().count() > SHORT_NAME_LIMIT {
        let mut short: String = name.chars().take(SHORT_NAME_KEEP).collect();
        short.push('…');
        short
    } else {
        name.to_string()
    }
}

/// The linked vote with the most yes+no ballots; the earliest one wins a tie.
fn representative_voting<'a>(
    group: &[RawStageEvent],
    votings: &'a [RawVotingRecord],
) -> Option<&'a RawVotingRecord> {
    let linked: BTreeSet<u32> = group
        .iter()
        .flat_map(|stage| stage.voting_num.iter().copied())
        .collect();
    if linked.is_empty() {
        return None;
    }
    votings
        .iter()
        .filter(|voting| linked.contains(&voting.voting_number))
        .fold(None, |best: Option<&RawVotingRecord>, voting| match best {
            Some(best) if best.decisive_total() >= voting.decisive_total() => Some(best),
            _ => Some(voting),
        })
}
