use crate::case::{CaseFile, Counsel, Side, Witness};
use crate::error::CommandError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Every courtroom voice the user can address.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RoleKind {
    Judge,
    Mentor,
    Clerk,
    Opposing,
    Jury,
    Witness,
}

impl RoleKind {
    pub fn parse(name: &str) -> Result<Self, CommandError> {
        RoleKind::from_str(name.trim()).map_err(|_| CommandError::UnknownRole(name.to_string()))
    }
}

/// A named role with the system instruction that conditions its replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub role: RoleKind,
    pub name: String,
    pub instruction: String,
}

/// Builds the persona for `role` as seen by a user arguing for `side`.
///
/// `witness` is only consulted for [`RoleKind::Witness`]; without one the generic
/// witness persona is returned.
pub fn resolve(role: RoleKind, side: Side, witness: Option<&Witness>, case: &CaseFile) -> Persona {
    match role {
        RoleKind::Judge => judge(side, case),
        RoleKind::Clerk => clerk(side),
        RoleKind::Jury => jury(side),
        RoleKind::Mentor => counsel(RoleKind::Mentor, case.mentor(side)),
        RoleKind::Opposing => counsel(RoleKind::Opposing, case.adversary(side)),
        RoleKind::Witness => match witness {
            Some(witness) => on_the_stand(witness, side, case),
            None => Persona {
                role,
                name: "Witness".to_string(),
                instruction: "You are a witness on the stand. Answer truthfully but briefly."
                    .to_string(),
            },
        },
    }
}

fn judge(side: Side, case: &CaseFile) -> Persona {
    let details = &case.details;
    let instruction = format!(
        "You are {judge}, presiding over {title} ({charge}).
The user is the {counsel}.

LEGAL STANDARD:
- This is a criminal trial. Burden of proof: beyond a reasonable doubt.
- Strict adherence to the Federal Rules of Evidence.

BEHAVIOR:
- If the user makes a valid objection (Hearsay, Speculation, Relevance), say \"Sustained\".
- If the objection is weak, say \"Overruled\".
- Be stern. Do not tolerate rambling.
- Occasionally interject if the lawyer is badgering the witness.",
        judge = details.presiding_judge,
        title = details.title,
        charge = details.charge,
        counsel = side.counsel_title(),
    );
    Persona {
        role: RoleKind::Judge,
        name: details.presiding_judge.clone(),
        instruction,
    }
}

fn clerk(side: Side) -> Persona {
    let addressee = match side {
        Side::Defense => "Defense Counsel",
        Side::Prosecution => "Prosecutor",
    };
    Persona {
        role: RoleKind::Clerk,
        name: "Court Clerk".to_string(),
        instruction: format!(
            "You are the Court Clerk. Explain simulation mechanics to the {addressee}. Be robotic and helpful."
        ),
    }
}

fn jury(side: Side) -> Persona {
    let instruction = format!(
        "You represent the collective consciousness of the 12 jurors.

CURRENT SENTIMENT:
- Analyze the last exchange. Did the {party} score a point?
- If the lawyer was confusing or aggressive, you dislike them.
- If the lawyer revealed a contradiction, you are impressed.
- Output inner monologue format: \"(Thinking) ...\"",
        party = side.party(),
    );
    Persona {
        role: RoleKind::Jury,
        name: "Jury Foreperson".to_string(),
        instruction,
    }
}

fn counsel(role: RoleKind, counsel: &Counsel) -> Persona {
    let heading = match role {
        RoleKind::Mentor => "ADVICE",
        _ => "STRATEGY",
    };
    let mut instruction = counsel.brief.clone();
    if !counsel.points.is_empty() {
        instruction.push_str(&format!("\n{heading}:\n{}", bullets(&counsel.points)));
    }
    Persona {
        role,
        name: counsel.name.clone(),
        instruction,
    }
}

fn on_the_stand(witness: &Witness, side: Side, case: &CaseFile) -> Persona {
    let stance = if witness.side.is_hostile_to(side) {
        "You are defensive and suspicious of the attorney."
    } else {
        "You are cooperative and open."
    };
    let instruction = format!(
        "You are acting as {name}, a witness in the trial {title}.

YOUR PROFILE:
- Role: {role}
- Personality: {personality}
- Stance: {stance}

YOUR KNOWLEDGE BASE (these are facts):
{facts}

YOUR OFFICIAL STATEMENT (do not contradict it unless pressured to admit a mistake):
\"{statement}\"

INTERACTION RULES:
1. Answer the attorney's questions based ONLY on your knowledge base and statement.
2. If asked about something not in your facts, say \"I don't recall\" or \"I don't know\".
3. If the attorney points out a contradiction between your statement and facts, react according to your personality.
4. Keep answers short (under 50 words) like real court testimony.
5. Do NOT break character.",
        name = witness.name,
        title = case.details.title,
        role = witness.role,
        personality = witness.personality,
        facts = bullets(&witness.facts),
        statement = witness.statement,
    );
    Persona {
        role: RoleKind::Witness,
        name: witness.name.clone(),
        instruction,
    }
}

fn bullets(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    const HOSTILE: &str = "You are defensive and suspicious of the attorney.";
    const COOPERATIVE: &str = "You are cooperative and open.";

    fn case() -> CaseFile {
        CaseFile::builtin().expect("bundled case")
    }

    #[test]
    fn prosecution_witness_is_hostile_to_defense() {
        let case = case();
        let miller = case.witness("miller").unwrap();
        let persona = resolve(RoleKind::Witness, Side::Defense, Some(miller), &case);
        assert_eq!(persona.name, "Officer Miller");
        assert!(persona.instruction.contains(HOSTILE));
        assert!(!persona.instruction.contains(COOPERATIVE));
    }

    #[test]
    fn own_and_neutral_witnesses_cooperate() {
        let case = case();
        let alex = case.witness("alex").unwrap();
        let sarah = case.witness("sarah").unwrap();
        for (witness, side) in [
            (alex, Side::Defense),
            (sarah, Side::Defense),
            (sarah, Side::Prosecution),
        ] {
            let persona = resolve(RoleKind::Witness, side, Some(witness), &case);
            assert!(persona.instruction.contains(COOPERATIVE), "{} vs {side}", witness.id);
        }
        let persona = resolve(RoleKind::Witness, Side::Prosecution, Some(alex), &case);
        assert!(persona.instruction.contains(HOSTILE));
    }

    #[test]
    fn witness_instruction_embeds_facts_and_statement() {
        let case = case();
        let miller = case.witness("miller").unwrap();
        let persona = resolve(RoleKind::Witness, Side::Prosecution, Some(miller), &case);
        assert!(persona.instruction.contains("- Did not find stolen jewelry on suspect."));
        assert!(persona.instruction.contains(&miller.statement));
        assert!(persona.instruction.contains("Arresting Officer"));
    }

    #[test]
    fn generic_witness_without_roster_entry() {
        let persona = resolve(RoleKind::Witness, Side::Defense, None, &case());
        assert_eq!(persona.name, "Witness");
    }

    #[test]
    fn counsel_personas_follow_user_side() {
        let case = case();
        assert_eq!(resolve(RoleKind::Mentor, Side::Defense, None, &case).name, "Co-Counsel Sarah");
        assert_eq!(resolve(RoleKind::Mentor, Side::Prosecution, None, &case).name, "D.A. Miller");
        assert_eq!(
            resolve(RoleKind::Opposing, Side::Defense, None, &case).name,
            "Prosecutor Vance"
        );
        let stone = resolve(RoleKind::Opposing, Side::Prosecution, None, &case);
        assert_eq!(stone.name, "Defense Attorney Stone");
        assert!(stone.instruction.contains("- You will object to everything."));
    }

    #[test]
    fn fixed_personas_name_the_user_side() {
        let case = case();
        let judge = resolve(RoleKind::Judge, Side::Prosecution, None, &case);
        assert_eq!(judge.name, "Judge Morrison");
        assert!(judge.instruction.contains("The user is the Prosecutor."));
        assert!(judge.instruction.contains("\"Sustained\""));
        let clerk = resolve(RoleKind::Clerk, Side::Defense, None, &case);
        assert!(clerk.instruction.contains("Defense Counsel"));
        let jury = resolve(RoleKind::Jury, Side::Prosecution, None, &case);
        assert!(jury.instruction.contains("Did the Prosecution score a point?"));
    }

    #[test]
    fn resolution_is_deterministic_for_every_role() {
        let case = case();
        let sarah = case.witness("sarah");
        for role in RoleKind::iter() {
            for side in [Side::Defense, Side::Prosecution] {
                let first = resolve(role, side, sarah, &case);
                assert_eq!(first, resolve(role, side, sarah, &case));
                assert_eq!(first.role, role);
            }
        }
    }

    #[test]
    fn role_names_parse_case_insensitively() {
        assert_eq!(RoleKind::parse("judge"), Ok(RoleKind::Judge));
        assert_eq!(RoleKind::parse("Opposing"), Ok(RoleKind::Opposing));
        assert_eq!(
            RoleKind::parse("bailiff"),
            Err(CommandError::UnknownRole("bailiff".to_string()))
        );
        assert_eq!(RoleKind::Jury.to_string(), "jury");
    }
}
