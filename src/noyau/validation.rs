//! Noyau : validation d'une formule d'affichage
//!
//! Contrôles, dans l'ordre (le premier en échec l'emporte) :
//! 1. non vide
//! 2. parenthèses équilibrées (première orpheline)
//! 3. placement des opérateurs
//! 4. couverture : aucun caractère inconnu, aucun déclencheur en attente
//! 5. essai de calcul (variables sans valeur = 1)

use std::cell::Cell;

use super::erreurs::{Diagnostic, EchecCalcul};
use super::eval::evaluer_jetons;
use super::jetons::{classify, Genre, Jeton};
use super::parentheses::{match_brackets, premiere_orpheline};
use super::variables::Catalogue;

pub const MESSAGE_VALIDE: &str = "formule valide";

#[derive(Clone, Debug, PartialEq)]
pub struct Validation {
    pub valide: bool,
    pub message: String,
    pub position: Option<usize>,
    pub diagnostic: Option<Diagnostic>,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valide: true,
            message: MESSAGE_VALIDE.into(),
            position: None,
            diagnostic: None,
        }
    }

    fn echec(d: Diagnostic) -> Self {
        Self {
            valide: false,
            message: d.to_string(),
            position: d.position(),
            diagnostic: Some(d),
        }
    }
}

pub fn validate(affichage: &str, catalogue: &Catalogue) -> Validation {
    match diagnostiquer(affichage, catalogue) {
        Ok(()) => Validation::ok(),
        Err(d) => {
            tracing::trace!(formule = affichage, diagnostic = %d, "formule refusée");
            Validation::echec(d)
        }
    }
}

fn diagnostiquer(affichage: &str, catalogue: &Catalogue) -> Result<(), Diagnostic> {
    if affichage.trim().is_empty() {
        return Err(Diagnostic::Vide);
    }

    let jetons = match_brackets(classify(affichage, catalogue));

    parentheses(&jetons)?;
    operateurs(&jetons)?;
    couverture(&jetons)?;
    essai(&jetons, catalogue)
}

fn parentheses(jetons: &[Jeton]) -> Result<(), Diagnostic> {
    match premiere_orpheline(jetons) {
        Some(j) if j.est_ouvrante() => Err(Diagnostic::ParentheseNonFermee { position: j.debut }),
        Some(j) => Err(Diagnostic::ParentheseSansOuvrante { position: j.debut }),
        None => Ok(()),
    }
}

fn operateurs(jetons: &[Jeton]) -> Result<(), Diagnostic> {
    let mut precedent: Option<&Jeton> = None;

    for j in jetons {
        let op = (j.genre == Genre::Operateur).then(|| j.premier()).flatten();

        match (precedent, op) {
            (None, Some(o)) if o != '-' => {
                return Err(Diagnostic::OperateurInitial {
                    operateur: o,
                    position: j.debut,
                })
            }
            (Some(p), Some(o)) if p.genre == Genre::Operateur && o != '-' => {
                return Err(Diagnostic::OperateursAdjacents { position: j.debut })
            }
            (Some(p), Some(o)) if p.est_ouvrante() && o != '-' => {
                return Err(Diagnostic::OperateurApresOuvrante {
                    operateur: o,
                    position: j.debut,
                })
            }
            (Some(p), None) if p.genre == Genre::Operateur && j.est_fermante() => {
                return Err(Diagnostic::OperateurAvantFermante { position: p.debut })
            }
            _ => {}
        }
        precedent = Some(j);
    }

    match precedent {
        Some(p) if p.genre == Genre::Operateur => Err(Diagnostic::OperateurFinal { position: p.debut }),
        _ => Ok(()),
    }
}

fn couverture(jetons: &[Jeton]) -> Result<(), Diagnostic> {
    for (i, j) in jetons.iter().enumerate() {
        match j.genre {
            Genre::Declencheur => return Err(Diagnostic::VariableIncomplete { position: j.debut }),
            Genre::Invalide => {
                let apres_nombre = i > 0
                    && jetons[i - 1].genre == Genre::Nombre
                    && jetons[i - 1].fin == j.debut;
                let c = j.premier().unwrap_or(' ');
                return Err(if c == '.' && apres_nombre {
                    Diagnostic::NombreIncomplet { position: j.debut }
                } else {
                    Diagnostic::CaractereInconnu {
                        caractere: c,
                        position: j.debut,
                    }
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn essai(jetons: &[Jeton], catalogue: &Catalogue) -> Result<(), Diagnostic> {
    let supposee = Cell::new(false);
    let resultat = evaluer_jetons(jetons, catalogue, |v| {
        Some(v.valeur.unwrap_or_else(|| {
            supposee.set(true);
            1.0
        }))
    });

    match resultat {
        Ok(_) => Ok(()),
        // un zéro obtenu avec des valeurs supposées ne prouve rien
        Err(EchecCalcul::DivisionParZero { position: None }) if supposee.get() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
