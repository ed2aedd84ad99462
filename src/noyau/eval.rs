//! Noyau : évaluation (pipeline réel)
//!
//! jetons -> contrôles (déclencheur, fin, parenthèses) -> Tok -> RPN -> exact (BigRational)
//!        -> arrondi 2 décimales (demi loin de zéro) -> f64
//!
//! Aucune exécution de code : la formule n'est jamais qu'une suite de jetons.
//! Tout échec devient `None` pour `evaluate` ; `evaluate_detail` garde la cause.

use std::collections::HashMap;

use num_rational::BigRational;

use super::erreurs::EchecCalcul;
use super::jetons::{classify_canonical, format_jetons, Genre, Jeton};
use super::lecture::{arrondi_scaled, depuis_f64, scaled_to_decimal, scaled_to_f64};
use super::rpn::{depuis_jetons, eval_rpn, format_tokens, to_rpn};
use super::variables::{Catalogue, Variable};

/// Nombre de décimales du résultat.
pub const DECIMALES: usize = 2;

#[derive(Default, Clone, Debug, PartialEq)]
pub struct Demarche {
    pub jetons: String,
    pub rpn: String,
    pub exact: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Calcul {
    pub valeur: f64,
    /// Valeur arrondie, toujours `DECIMALES` chiffres après le point.
    pub texte: String,
    pub demarche: Demarche,
}

/// API publique : valeur d'une formule canonique, ou None.
///
/// `valeurs` associe chaque code de variable à sa valeur.
pub fn evaluate(canonique: &str, catalogue: &Catalogue, valeurs: &HashMap<String, f64>) -> Option<f64> {
    match evaluate_detail(canonique, catalogue, valeurs) {
        Ok(c) => Some(c.valeur),
        Err(e) => {
            tracing::trace!(formule = canonique, erreur = %e, "évaluation impossible");
            None
        }
    }
}

/// Comme `evaluate`, avec la cause de l'échec et la démarche (jetons, RPN, exact).
pub fn evaluate_detail(
    canonique: &str,
    catalogue: &Catalogue,
    valeurs: &HashMap<String, f64>,
) -> Result<Calcul, EchecCalcul> {
    if canonique.trim().is_empty() {
        return Err(EchecCalcul::Vide);
    }
    let jetons = classify_canonical(canonique, catalogue);
    evaluer_jetons(&jetons, catalogue, |v| valeurs.get(&v.code).copied())
}

/// Évalue avec les valeurs portées par le catalogue lui-même.
pub fn evaluer_catalogue(canonique: &str, catalogue: &Catalogue) -> Result<Calcul, EchecCalcul> {
    evaluate_detail(canonique, catalogue, &catalogue.valeurs())
}

/// Cœur commun (texte canonique ou d'affichage : seuls les jetons comptent).
pub(crate) fn evaluer_jetons(
    jetons: &[Jeton],
    catalogue: &Catalogue,
    valeur_de: impl Fn(&Variable) -> Option<f64>,
) -> Result<Calcul, EchecCalcul> {
    // 1) Déclencheur en attente / caractère inconnu
    for j in jetons {
        match j.genre {
            Genre::Declencheur => return Err(EchecCalcul::DeclencheurEnAttente { position: j.debut }),
            Genre::Invalide => return Err(EchecCalcul::NonReconnu { position: j.debut }),
            _ => {}
        }
    }

    // 2) Formule inachevée : opérateur ou '(' en dernier
    let Some(dernier) = jetons.last() else {
        return Err(EchecCalcul::Vide);
    };
    if dernier.genre == Genre::Operateur || dernier.est_ouvrante() {
        return Err(EchecCalcul::Incomplete { position: dernier.debut });
    }

    // 3) Comptes de parenthèses
    let ouvrantes = jetons.iter().filter(|j| j.est_ouvrante()).count();
    let fermantes = jetons.iter().filter(|j| j.est_fermante()).count();
    if ouvrantes != fermantes {
        return Err(EchecCalcul::ParenthesesDesequilibrees);
    }

    // 4) Tok -> RPN
    let toks = depuis_jetons(jetons)?;
    let rpn = to_rpn(&toks)?;

    // 5) Exact
    let valeur = |i: usize| -> Result<BigRational, EchecCalcul> {
        let v = catalogue.get(i).ok_or(EchecCalcul::Syntaxe)?;
        let x = valeur_de(v).ok_or_else(|| EchecCalcul::ValeurManquante { code: v.code.clone() })?;
        depuis_f64(x).ok_or(EchecCalcul::NonFini)
    };
    let exact = eval_rpn(&rpn, valeur)?;

    // 6) Arrondi
    let scaled = arrondi_scaled(&exact, DECIMALES);
    let valeur = scaled_to_f64(&scaled, DECIMALES).ok_or(EchecCalcul::NonFini)?;
    let texte = scaled_to_decimal(scaled, DECIMALES);

    Ok(Calcul {
        valeur,
        texte,
        demarche: Demarche {
            jetons: format_jetons(jetons),
            rpn: format_tokens(&rpn, catalogue),
            exact: exact.to_string(),
        },
    })
}
