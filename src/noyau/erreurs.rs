//! Noyau : taxonomie des échecs
//!
//! - Saisie refusée : pas une erreur (Admission.acceptee == false).
//! - Jeton invalide : `Genre::Invalide` dans la classification.
//! - Erreur structurelle : `Diagnostic` (validation).
//! - Échec de calcul : `EchecCalcul` (l'évaluateur renvoie None).
//! - Catalogue incohérent : `CatalogueErreur` (à la construction seulement).
//!
//! Aucune de ces valeurs ne panique ; toutes portent la position quand elle existe.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EchecCalcul {
    #[error("expression vide")]
    Vide,

    #[error("formule incomplète")]
    Incomplete { position: usize },

    #[error("choix de variable en attente")]
    DeclencheurEnAttente { position: usize },

    #[error("caractère non reconnu")]
    NonReconnu { position: usize },

    #[error("parenthèses déséquilibrées")]
    ParenthesesDesequilibrees,

    #[error("division par zéro")]
    DivisionParZero { position: Option<usize> },

    #[error("valeur manquante pour « {code} »")]
    ValeurManquante { code: String },

    #[error("résultat non fini")]
    NonFini,

    #[error("expression invalide")]
    Syntaxe,
}

impl EchecCalcul {
    pub fn position(&self) -> Option<usize> {
        match self {
            EchecCalcul::Incomplete { position }
            | EchecCalcul::DeclencheurEnAttente { position }
            | EchecCalcul::NonReconnu { position } => Some(*position),
            EchecCalcul::DivisionParZero { position } => *position,
            EchecCalcul::Vide
            | EchecCalcul::ParenthesesDesequilibrees
            | EchecCalcul::ValeurManquante { .. }
            | EchecCalcul::NonFini
            | EchecCalcul::Syntaxe => None,
        }
    }
}

/// Diagnostic du validateur (premier contrôle en échec).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("la formule est vide")]
    Vide,

    #[error("parenthèse ouvrante non fermée")]
    ParentheseNonFermee { position: usize },

    #[error("parenthèse fermante sans ouvrante")]
    ParentheseSansOuvrante { position: usize },

    #[error("la formule ne peut pas commencer par « {operateur} »")]
    OperateurInitial { operateur: char, position: usize },

    #[error("opérateurs adjacents")]
    OperateursAdjacents { position: usize },

    #[error("opérateur « {operateur} » juste après une parenthèse ouvrante")]
    OperateurApresOuvrante { operateur: char, position: usize },

    #[error("opérateur juste avant une parenthèse fermante")]
    OperateurAvantFermante { position: usize },

    #[error("la formule se termine par un opérateur")]
    OperateurFinal { position: usize },

    #[error("caractère non reconnu « {caractere} »")]
    CaractereInconnu { caractere: char, position: usize },

    #[error("nombre incomplet")]
    NombreIncomplet { position: usize },

    #[error("variable à choisir")]
    VariableIncomplete { position: usize },

    #[error("calcul impossible : {0}")]
    Calcul(#[from] EchecCalcul),
}

impl Diagnostic {
    pub fn position(&self) -> Option<usize> {
        use Diagnostic::*;
        match self {
            Vide => None,
            ParentheseNonFermee { position }
            | ParentheseSansOuvrante { position }
            | OperateurInitial { position, .. }
            | OperateursAdjacents { position }
            | OperateurApresOuvrante { position, .. }
            | OperateurAvantFermante { position }
            | OperateurFinal { position }
            | CaractereInconnu { position, .. }
            | NombreIncomplet { position }
            | VariableIncomplete { position } => Some(*position),
            Calcul(e) => e.position(),
        }
    }
}

/// Violation de la précondition de non-chevauchement du catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueErreur {
    #[error("variable n°{index} : nom vide")]
    NomVide { index: usize },

    #[error("variable « {nom} » : code vide")]
    CodeVide { nom: String },

    #[error("nom « {nom} » ambigu avec un nombre, un opérateur ou une parenthèse")]
    NomAmbigu { nom: String },

    #[error("code « {code} » ambigu avec un nombre, un opérateur ou une parenthèse")]
    CodeAmbigu { code: String },

    #[error("le nom « {court} » est contenu dans « {long} »")]
    NomsChevauchants { court: String, long: String },

    #[error("le code « {court} » est contenu dans « {long} »")]
    CodesChevauchants { court: String, long: String },

    #[error("déclencheur « {declencheur} » ambigu avec la formule")]
    DeclencheurAmbigu { declencheur: char },
}
