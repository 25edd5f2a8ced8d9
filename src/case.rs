// Static case data: docket, witness roster, timeline, counsel profiles and tactical templates.
use crate::error::CaseError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};

const BUILTIN_CASE: &str = include_str!("../assets/case.json");

/// The side the user argues for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Prosecution,
    Defense,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Prosecution => Side::Defense,
            Side::Defense => Side::Prosecution,
        }
    }

    /// How the court refers to the user's counsel in the transcript.
    pub fn counsel_title(self) -> &'static str {
        match self {
            Side::Defense => "Defense Attorney",
            Side::Prosecution => "Prosecutor",
        }
    }

    /// Role label shown with the case details.
    pub fn role_label(self) -> &'static str {
        match self {
            Side::Defense => "Defense Attorney",
            Side::Prosecution => "Lead Prosecutor",
        }
    }

    pub fn party(self) -> &'static str {
        match self {
            Side::Defense => "Defense",
            Side::Prosecution => "Prosecution",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Prosecution => write!(f, "prosecution"),
            Side::Defense => write!(f, "defense"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WitnessSide {
    Prosecution,
    Defense,
    Neutral,
}

impl WitnessSide {
    // Hostile only when the witness was called by the other party; neutral witnesses cooperate.
    pub fn is_hostile_to(self, user_side: Side) -> bool {
        matches!(
            (user_side, self),
            (Side::Defense, WitnessSide::Prosecution) | (Side::Prosecution, WitnessSide::Defense)
        )
    }

    /// The party announced as calling this witness to the stand.
    pub fn calling_party(self) -> &'static str {
        match self {
            WitnessSide::Prosecution => "Prosecution",
            WitnessSide::Defense | WitnessSide::Neutral => "Defense",
        }
    }
}

/// A value that differs depending on which side the user plays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BySide<T> {
    pub defense: T,
    pub prosecution: T,
}

impl<T> BySide<T> {
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Defense => &self.defense,
            Side::Prosecution => &self.prosecution,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDetails {
    pub title: String,
    pub defendant: String,
    pub charge: String,
    pub location: String,
    pub day: u32,
    pub total_days: u32,
    pub presiding_judge: String,
    pub description: BySide<String>,
}

// Scripted lines and fixed instructions used by the automatic turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtScript {
    pub judge_opening: BySide<String>,
    pub opening_statement: String,
    pub rebuttal: String,
}

/// Name and briefing for a counsel persona (mentor or opposing counsel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counsel {
    pub name: String,
    pub brief: String,
    #[serde(default)]
    pub points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    pub id: String,
    pub name: String,
    pub role: String,
    pub side: WitnessSide,
    pub description: String,
    pub personality: String,
    #[serde(default)]
    pub facts: Vec<String>,
    pub statement: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Filing,
    Motion,
    Hearing,
    Evidence,
    Plea,
    Ruling,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Filing => "FILING",
            EventKind::Motion => "MOTION",
            EventKind::Hearing => "HEARING",
            EventKind::Evidence => "EVIDENCE",
            EventKind::Plea => "PLEA",
            EventKind::Ruling => "RULING",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Pdf,
    Image,
    Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub name: String,
}

/// Which attachments the evidence locker lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EvidenceFilter {
    #[default]
    All,
    Document,
    Image,
    Pdf,
}

impl EvidenceFilter {
    pub fn admits(self, kind: AttachmentKind) -> bool {
        match self {
            EvidenceFilter::All => true,
            EvidenceFilter::Document => kind == AttachmentKind::Document,
            EvidenceFilter::Image => kind == AttachmentKind::Image,
            EvidenceFilter::Pdf => kind == AttachmentKind::Pdf,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStep {
    pub step: String,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: u32,
    pub kind: EventKind,
    pub title: String,
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub ai_chain: Vec<ChainStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub label: String,
    pub text: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptCategory {
    pub id: String,
    pub title: String,
    pub templates: Vec<PromptTemplate>,
}

/// Everything the court knows about the case, loaded once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseFile {
    pub details: CaseDetails,
    pub script: CourtScript,
    pub mentors: BySide<Counsel>,
    pub opposing_counsel: BySide<Counsel>,
    pub witnesses: Vec<Witness>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub templates: Vec<PromptCategory>,
}

impl CaseFile {
    /// The case bundled with the binary.
    pub fn builtin() -> Result<Self, CaseError> {
        Self::from_json(BUILTIN_CASE)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CaseError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(json: &str) -> Result<Self, CaseError> {
        let case: CaseFile = serde_json::from_str(json)?;
        case.validate()?;
        Ok(case)
    }

    fn validate(&self) -> Result<(), CaseError> {
        let mut seen = HashSet::new();
        for witness in &self.witnesses {
            if witness.id.trim().is_empty() {
                return Err(CaseError::EmptyWitnessId(witness.name.clone()));
            }
            if !seen.insert(witness.id.as_str()) {
                return Err(CaseError::DuplicateWitness(witness.id.clone()));
            }
        }
        Ok(())
    }

    pub fn witness(&self, id: &str) -> Option<&Witness> {
        self.witnesses.iter().find(|w| w.id == id)
    }

    pub fn witnesses(&self) -> &[Witness] {
        &self.witnesses
    }

    pub fn timeline(&self) -> &[TimelineEvent] {
        &self.timeline
    }

    pub fn templates(&self) -> &[PromptCategory] {
        &self.templates
    }

    pub fn template(&self, id: &str) -> Option<&PromptTemplate> {
        self.templates
            .iter()
            .flat_map(|category| category.templates.iter())
            .find(|template| template.id == id)
    }

    /// Every timeline attachment the filter admits, paired with its event, in docket order.
    pub fn evidence(
        &self,
        filter: EvidenceFilter,
    ) -> impl Iterator<Item = (&TimelineEvent, &Attachment)> {
        self.timeline.iter().flat_map(move |event| {
            event
                .attachments
                .iter()
                .filter(move |attachment| filter.admits(attachment.kind))
                .map(move |attachment| (event, attachment))
        })
    }

    /// The same-side ally advising the user.
    pub fn mentor(&self, side: Side) -> &Counsel {
        self.mentors.get(side)
    }

    /// Counsel for the other party, as faced by a user on `side`.
    pub fn adversary(&self, side: Side) -> &Counsel {
        self.opposing_counsel.get(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_case_loads() {
        let case = CaseFile::builtin().expect("bundled case should parse");
        assert_eq!(case.details.title, "State vs. Alex Henderson");
        assert_eq!(case.witnesses().len(), 3);
        assert_eq!(case.timeline().len(), 6);
        assert_eq!(case.timeline()[3].ai_chain.len(), 3);
        assert!(case.timeline()[5].pinned);
    }

    #[test]
    fn witness_lookup_by_id() {
        let case = CaseFile::builtin().unwrap();
        let miller = case.witness("miller").unwrap();
        assert_eq!(miller.name, "Officer Miller");
        assert_eq!(miller.side, WitnessSide::Prosecution);
        assert_eq!(miller.facts.len(), 4);
        assert!(case.witness("nobody").is_none());
    }

    #[test]
    fn counsel_depends_on_side() {
        let case = CaseFile::builtin().unwrap();
        assert_eq!(case.mentor(Side::Defense).name, "Co-Counsel Sarah");
        assert_eq!(case.mentor(Side::Prosecution).name, "D.A. Miller");
        assert_eq!(case.adversary(Side::Defense).name, "Prosecutor Vance");
        assert_eq!(case.adversary(Side::Prosecution).name, "Defense Attorney Stone");
    }

    #[test]
    fn template_lookup_spans_categories() {
        let case = CaseFile::builtin().unwrap();
        let template = case.template("proc-approach").unwrap();
        assert_eq!(template.text, "May we approach the bench, Your Honor?");
        assert!(case.template("missing").is_none());
    }

    #[test]
    fn hostility_follows_sides() {
        assert!(WitnessSide::Prosecution.is_hostile_to(Side::Defense));
        assert!(WitnessSide::Defense.is_hostile_to(Side::Prosecution));
        assert!(!WitnessSide::Defense.is_hostile_to(Side::Defense));
        assert!(!WitnessSide::Neutral.is_hostile_to(Side::Defense));
        assert!(!WitnessSide::Neutral.is_hostile_to(Side::Prosecution));
    }

    #[test]
    fn duplicate_witness_ids_are_rejected() {
        let mut case = CaseFile::builtin().unwrap();
        let copy = case.witnesses[0].clone();
        case.witnesses.push(copy);
        let json = serde_json::to_string(&case).unwrap();
        match CaseFile::from_json(&json) {
            Err(CaseError::DuplicateWitness(id)) => assert_eq!(id, "miller"),
            other => panic!("expected duplicate witness error, got {other:?}"),
        }
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        std::fs::write(&path, BUILTIN_CASE).unwrap();
        let case = CaseFile::load(&path).unwrap();
        assert_eq!(case.details.presiding_judge, "Judge Morrison");
    }

    #[test]
    fn evidence_filter_narrows_attachments() {
        let case = CaseFile::builtin().unwrap();
        let names = |filter| {
            case.evidence(filter)
                .map(|(_, attachment)| attachment.name.as_str())
                .collect::<Vec<_>>()
        };

        assert_eq!(names(EvidenceFilter::All).len(), 5);
        assert_eq!(names(EvidenceFilter::Pdf), ["Motion.pdf", "Forensics.pdf"]);
        assert_eq!(names(EvidenceFilter::Image), ["Crime_Scene.jpg"]);
        assert_eq!(
            names(EvidenceFilter::Document),
            ["Miller_Report.pdf", "Jenkins_Transcript.pdf"]
        );
        assert_eq!("PDF".parse::<EvidenceFilter>(), Ok(EvidenceFilter::Pdf));
    }
}
