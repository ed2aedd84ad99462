//! Propriétés de l'éditeur (campagne déterministe).
//!
//! - aller-retour canonique -> affichage -> canonique
//! - jamais plus de ')' que de '(' après une suite de frappes admises
//! - frappe refusée = texte et curseur inchangés
//! - navigation toujours dans [0, len]
//! - valeurs de référence de l'évaluateur et du validateur

use std::collections::HashMap;

use pretty_assertions::assert_eq;

use super::curseur::{move_cursor, Direction};
use super::erreurs::Diagnostic;
use super::eval::evaluate;
use super::saisie::admit;
use super::validation::validate;
use super::variables::{to_canonical, to_display, Catalogue, Variable};

fn catalogue() -> Catalogue {
    Catalogue::new(vec![
        Variable::new("@Revenue", "rev"),
        Variable::new("@RevenueNet", "revnet"),
        Variable::new("@Cost", "cost"),
        Variable::new("@Q1_total", "q1t"),
    ])
    .unwrap()
}

/// Toutes les chaînes de longueur <= n sur un petit alphabet.
fn toutes_les_chaines(alphabet: &[&str], n: usize) -> Vec<String> {
    let mut niveau = vec![String::new()];
    let mut tout = niveau.clone();
    for _ in 0..n {
        niveau = niveau
            .iter()
            .flat_map(|p| alphabet.iter().map(move |a| format!("{p}{a}")))
            .collect();
        tout.extend(niveau.iter().cloned());
    }
    tout
}

#[test]
fn aller_retour_canonique() {
    let cat = catalogue();
    let morceaux = ["rev", "revnet", "cost", "q1t", "2", "+", "*", "(", ")", "-"];
    for c in toutes_les_chaines(&morceaux, 3) {
        assert_eq!(to_canonical(&to_display(&c, &cat), &cat), c, "canonique={c:?}");
    }
}

#[test]
fn parentheses_jamais_en_exces() {
    let cat = catalogue();
    for frappes in toutes_les_chaines(&["(", ")", "1", "+", "@"], 6) {
        let (mut texte, mut curseur) = (String::new(), 0usize);
        for c in frappes.chars() {
            let a = admit(&texte, c, curseur, &cat);
            texte = a.texte;
            curseur = a.curseur;
            assert!(
                texte.matches(')').count() <= texte.matches('(').count(),
                "{frappes:?} -> {texte:?}"
            );
        }
    }
}

#[test]
fn refus_idempotent() {
    let cat = catalogue();
    let textes = ["", "3+", "(@Revenue", "1.5", "@", "3*-", "((2)"];
    for texte in textes {
        for curseur in 0..=texte.chars().count() + 1 {
            for c in "0.+-*/()@x ".chars() {
                let a = admit(texte, c, curseur, &cat);
                if !a.acceptee {
                    assert_eq!((a.texte.as_str(), a.curseur), (texte, curseur));
                }
            }
        }
    }
}

#[test]
fn navigation_bornee() {
    let cat = catalogue();
    for texte in ["", "12.5", "@Revenue+@Cost", "3*-(x)", "??"] {
        let len = texte.chars().count();
        for pos in 0..len + 3 {
            for d in [Direction::Gauche, Direction::Droite] {
                let p = move_cursor(texte, pos, d, &cat);
                assert!(p <= len, "{texte:?} {pos} {d:?} -> {p}");
            }
        }
    }
}

#[test]
fn valeurs_de_reference() {
    let cat = Catalogue::vide();
    let v = HashMap::new();
    assert_eq!(evaluate("3+4*2", &cat, &v), Some(11.0));
    assert_eq!(evaluate("(3+4)*2", &cat, &v), Some(14.0));
    assert_eq!(evaluate("5/0", &cat, &v), None);
    assert_eq!(evaluate("3+", &cat, &v), None);
}

#[test]
fn moins_cinq_fois_fois() {
    let cat = catalogue();
    let (mut texte, mut curseur) = (String::new(), 0usize);
    for c in ['-', '5', '*', '*'] {
        let a = admit(&texte, c, curseur, &cat);
        texte = a.texte;
        curseur = a.curseur;
    }
    assert_eq!((texte.as_str(), curseur), ("-5*", 3));
}

#[test]
fn parenthese_non_fermee_position() {
    let v = validate("3+(4*2", &catalogue());
    assert!(!v.valide);
    assert_eq!(v.position, Some(2));
    assert_eq!(v.diagnostic, Some(Diagnostic::ParentheseNonFermee { position: 2 }));
}
