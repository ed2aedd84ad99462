//! Noyau de l'éditeur de formules
//!
//! Organisation interne :
//! - alphabet.rs    : tables statiques (opérateurs, déclencheur, palette)
//! - erreurs.rs     : échecs typés (calcul, diagnostic, catalogue)
//! - jetons.rs      : classification du texte en empans
//! - parentheses.rs : appariement + profondeur
//! - variables.rs   : catalogue + substitution nom <-> code + recherche
//! - saisie.rs      : admission frappe par frappe, insertion de variable, effacement
//! - curseur.rs     : déplacement jeton par jeton
//! - lecture.rs     : décimal <-> rationnel exact, arrondi
//! - rpn.rs         : shunting-yard + pile d'évaluation
//! - eval.rs        : pipeline d'évaluation
//! - validation.rs  : diagnostic complet d'une formule
//! - tampon.rs      : tampon d'édition immuable (API de la coque)

pub mod alphabet;
pub mod curseur;
pub mod erreurs;
pub mod eval;
pub mod jetons;
pub mod lecture;
pub mod parentheses;
pub mod rpn;
pub mod saisie;
pub mod tampon;
pub mod validation;
pub mod variables;

#[cfg(test)]
mod tests_proprietes;

#[cfg(test)]
mod tests_fuzz_safe;

// API utilisée par la coque
pub use curseur::Direction;
pub use erreurs::CatalogueErreur;
pub use jetons::{EtatParenthese, Genre, Jeton};
pub use tampon::Tampon;
pub use validation::Validation;
pub use variables::{filtrer, Catalogue, Variable};
