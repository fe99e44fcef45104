//! Résolution des listes libres d'initiales (collées depuis un mail, un tableur…)
//! en références vers le personnel.

use crate::error::Advisory;
use crate::model::{Staff, StaffId};

/// Résultat d'une résolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Identifiants reconnus, sans doublon, dans l'ordre de première apparition.
    pub matched: Vec<StaffId>,
    /// Jetons non reconnus, conservés tels que saisis.
    pub unmatched: Vec<String>,
    /// Jetons résolus alors que plusieurs agents correspondaient.
    pub ambiguous: Vec<Advisory>,
}

impl Resolution {
    fn absorb(&mut self, token: &str, directory: &[Staff]) {
        let candidates = resolve_candidates(token, directory);
        match candidates.first() {
            Some(first) => {
                if let Some(adv) = ambiguity(token, &candidates) {
                    tracing::warn!(token, candidates = candidates.len(), "ambiguous initials");
                    if !self.ambiguous.contains(&adv) {
                        self.ambiguous.push(adv);
                    }
                }
                if !self.matched.contains(&first.id) {
                    self.matched.push(first.id.clone());
                }
            }
            None => self.unmatched.push(token.to_owned()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }

    /// Jetons non reconnus, réassemblés pour le champ de saisie.
    pub fn unmatched_text(&self) -> String {
        self.unmatched.join(", ")
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

fn split_tokens(free_text: &str) -> impl Iterator<Item = &str> {
    free_text.split(is_separator).filter(|t| !t.is_empty())
}

fn ambiguity(token: &str, candidates: &[&Staff]) -> Option<Advisory> {
    (candidates.len() > 1).then(|| Advisory::AmbiguousInitials {
        token: token.to_uppercase(),
        candidates: candidates.iter().map(|s| s.id.clone()).collect(),
    })
}

fn first_segment(s: &str) -> &str {
    s.split('-').next().unwrap_or(s)
}

/// Tous les agents correspondant à un jeton, dans l'ordre de l'annuaire.
///
/// Correspondance exacte des initiales d'abord ; à défaut, comparaison du
/// premier segment avant `-` (`MS` ou `MS-X` trouvent `MS-ATZ`).
pub fn resolve_candidates<'a>(token: &str, directory: &'a [Staff]) -> Vec<&'a Staff> {
    let token = token.trim().to_uppercase();
    if token.is_empty() {
        return Vec::new();
    }
    let exact: Vec<&Staff> = directory
        .iter()
        .filter(|s| s.initials.to_uppercase() == token)
        .collect();
    if !exact.is_empty() {
        return exact;
    }
    let prefix = first_segment(&token);
    directory
        .iter()
        .filter(|s| first_segment(&s.initials.to_uppercase()) == prefix)
        .collect()
}

/// Découpe `free_text` sur les blancs et virgules puis résout chaque jeton ;
/// le premier agent trouvé dans l'ordre de l'annuaire l'emporte.
pub fn resolve_tokens(free_text: &str, directory: &[Staff]) -> Resolution {
    let mut out = Resolution::default();
    for token in split_tokens(free_text) {
        out.absorb(token, directory);
    }
    out
}

/// Jetons de `free_text` correspondant à plusieurs agents, un avertissement par jeton.
pub fn ambiguous_tokens(free_text: &str, directory: &[Staff]) -> Vec<Advisory> {
    let mut out: Vec<Advisory> = Vec::new();
    for token in split_tokens(free_text) {
        if let Some(adv) = ambiguity(token, &resolve_candidates(token, directory)) {
            if !out.contains(&adv) {
                out.push(adv);
            }
        }
    }
    out
}

/// Résolution au fil de la saisie : chaque séparateur tapé résout les jetons
/// complets, `commit` résout le dernier jeton resté sans séparateur.
#[derive(Debug, Clone, Default)]
pub struct StreamingResolver {
    buffer: String,
    acc: Resolution,
}

impl StreamingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, input: &str, directory: &[Staff]) {
        self.buffer.push_str(input);
        let Some(cut) = self.buffer.rfind(is_separator) else {
            return;
        };
        let sep_len = self.buffer[cut..].chars().next().map_or(1, char::len_utf8);
        let tail = self.buffer.split_off(cut + sep_len);
        let complete = std::mem::replace(&mut self.buffer, tail);
        for token in split_tokens(&complete) {
            self.acc.absorb(token, directory);
        }
    }

    /// Texte encore en cours de saisie.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn resolved(&self) -> &Resolution {
        &self.acc
    }

    pub fn commit(mut self, directory: &[Staff]) -> Resolution {
        let rest = std::mem::take(&mut self.buffer);
        for token in split_tokens(&rest) {
            self.acc.absorb(token, directory);
        }
        self.acc
    }
}
