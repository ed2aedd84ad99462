// src/noyau/curseur.rs
//
// Déplacement du curseur jeton par jeton.
// - nombre / variable : unité atomique, on saute à la frontière opposée
// - opérateur / parenthèse : un caractère à la fois ("*-" = deux pas)
// - caractère non reconnu : on file vers le prochain nombre/variable, sinon le prochain
//   opérateur, sinon un caractère
// Résultat toujours dans [0, len].

use super::jetons::{classify, Genre, Jeton};
use super::variables::Catalogue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Gauche,
    Droite,
}

pub fn move_cursor(texte: &str, position: usize, direction: Direction, catalogue: &Catalogue) -> usize {
    let jetons = classify(texte, catalogue);
    let len = jetons.last().map_or(0, |j| j.fin);
    let pos = position.min(len);

    match direction {
        Direction::Droite => vers_la_droite(&jetons, pos, len),
        Direction::Gauche => vers_la_gauche(&jetons, pos),
    }
}

fn est_ponctuel(j: &Jeton) -> bool {
    matches!(j.genre, Genre::Operateur | Genre::Parenthese)
}

fn vers_la_droite(jetons: &[Jeton], pos: usize, len: usize) -> usize {
    if pos >= len {
        return len;
    }
    if let Some(j) = jetons.iter().find(|j| j.est_atomique() && j.debut <= pos && pos < j.fin) {
        return j.fin;
    }
    if let Some(j) = jetons.iter().find(|j| est_ponctuel(j) && j.debut == pos) {
        return j.fin;
    }
    if let Some(j) = jetons.iter().find(|j| j.est_atomique() && j.debut > pos) {
        return j.debut;
    }
    if let Some(j) = jetons.iter().find(|j| j.genre == Genre::Operateur && j.debut > pos) {
        return j.debut;
    }
    (pos + 1).min(len)
}

fn vers_la_gauche(jetons: &[Jeton], pos: usize) -> usize {
    if pos == 0 {
        return 0;
    }
    if let Some(j) = jetons.iter().find(|j| j.est_atomique() && j.debut < pos && pos <= j.fin) {
        return j.debut;
    }
    if let Some(j) = jetons.iter().find(|j| est_ponctuel(j) && j.fin == pos) {
        return j.debut;
    }
    if let Some(j) = jetons.iter().rev().find(|j| j.est_atomique() && j.fin < pos) {
        return j.fin;
    }
    if let Some(j) = jetons.iter().rev().find(|j| j.genre == Genre::Operateur && j.fin < pos) {
        return j.fin;
    }
    pos - 1
}
