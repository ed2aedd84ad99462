// src/noyau/tampon.rs
//
// Tampon d'édition immuable : chaque opération rend un nouveau tampon.
// - `affichage` : texte avec les noms lisibles (ce que voit l'utilisateur)
// - `canonique` : texte avec les codes (calcul, stockage)
// - `curseur`   : position en caractères dans `affichage`
// - `complet`   : formule prête à évaluer (aucune attente)
//
// Invariant : canonique == to_canonical(affichage), recalculé à chaque opération.

use serde::{Deserialize, Serialize};

use super::alphabet::est_operateur;
use super::curseur::{move_cursor, Direction};
use super::erreurs::EchecCalcul;
use super::eval::{evaluer_catalogue, Calcul};
use super::jetons::{classify, Genre, Jeton};
use super::parentheses::match_brackets;
use super::saisie::{admit, delete_backward, delete_forward, insert_variable, Admission};
use super::validation::{validate, Validation};
use super::variables::{to_canonical, to_display, Catalogue};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tampon {
    pub affichage: String,
    pub canonique: String,
    pub curseur: usize,
    pub complet: bool,
}

impl Tampon {
    pub fn vide() -> Self {
        Self::default()
    }

    /// Curseur borné à la longueur du texte.
    pub fn depuis_affichage(affichage: &str, curseur: usize, catalogue: &Catalogue) -> Self {
        let longueur = affichage.chars().count();
        Self {
            affichage: affichage.to_string(),
            canonique: to_canonical(affichage, catalogue),
            curseur: curseur.min(longueur),
            complet: est_complet(affichage, catalogue),
        }
    }

    /// Formule stockée par l'hôte ; curseur en fin.
    pub fn depuis_canonique(canonique: &str, catalogue: &Catalogue) -> Self {
        let affichage = to_display(canonique, catalogue);
        let fin = affichage.chars().count();
        Self::depuis_affichage(&affichage, fin, catalogue)
    }

    fn appliquer(&self, a: Admission, catalogue: &Catalogue) -> Option<Tampon> {
        a.acceptee
            .then(|| Self::depuis_affichage(&a.texte, a.curseur, catalogue))
    }

    /// Frappe clavier ; None si refusée.
    pub fn saisir(&self, c: char, catalogue: &Catalogue) -> Option<Tampon> {
        self.appliquer(admit(&self.affichage, c, self.curseur, catalogue), catalogue)
    }

    pub fn inserer_variable(&self, index: usize, catalogue: &Catalogue) -> Option<Tampon> {
        self.appliquer(
            insert_variable(&self.affichage, self.curseur, index, catalogue),
            catalogue,
        )
    }

    pub fn effacer_avant(&self, catalogue: &Catalogue) -> Option<Tampon> {
        self.appliquer(delete_backward(&self.affichage, self.curseur, catalogue), catalogue)
    }

    pub fn effacer_apres(&self, catalogue: &Catalogue) -> Option<Tampon> {
        self.appliquer(delete_forward(&self.affichage, self.curseur, catalogue), catalogue)
    }

    pub fn deplacer(&self, direction: Direction, catalogue: &Catalogue) -> Tampon {
        Tampon {
            curseur: move_cursor(&self.affichage, self.curseur, direction, catalogue),
            ..self.clone()
        }
    }

    /// Curseur placé directement (Début / Fin), borné ; refusé au milieu d'une variable.
    pub fn placer(&self, position: usize, catalogue: &Catalogue) -> Tampon {
        let pos = position.min(self.affichage.chars().count());
        let dedans = classify(&self.affichage, catalogue)
            .iter()
            .any(|j| j.genre == Genre::Variable && j.debut < pos && pos < j.fin);
        if dedans {
            return self.clone();
        }
        Tampon {
            curseur: pos,
            ..self.clone()
        }
    }

    pub fn longueur(&self) -> usize {
        self.affichage.chars().count()
    }

    /// Jetons de l'affichage, parenthèses appariées (coloration).
    pub fn jetons(&self, catalogue: &Catalogue) -> Vec<Jeton> {
        match_brackets(classify(&self.affichage, catalogue))
    }

    /// Déclencheur en attente juste avant le curseur (sélecteur ouvert).
    pub fn declencheur_en_attente(&self, catalogue: &Catalogue) -> bool {
        self.curseur > 0
            && classify(&self.affichage, catalogue)
                .iter()
                .any(|j| j.genre == Genre::Declencheur && j.fin == self.curseur)
    }

    pub fn evaluer(&self, catalogue: &Catalogue) -> Result<Calcul, EchecCalcul> {
        evaluer_catalogue(&self.canonique, catalogue)
    }

    pub fn valider(&self, catalogue: &Catalogue) -> Validation {
        validate(&self.affichage, catalogue)
    }
}

/// Prête à évaluer : non vide, tout reconnu, pas d'opérateur ni de '(' final, équilibrée.
pub fn est_complet(affichage: &str, catalogue: &Catalogue) -> bool {
    let jetons = classify(affichage, catalogue);
    let Some(dernier) = jetons.last() else {
        return false;
    };
    let reconnu = jetons
        .iter()
        .all(|j| !matches!(j.genre, Genre::Invalide | Genre::Declencheur));
    let fin_ouverte = dernier.premier().is_some_and(|c| est_operateur(c) || c == '(');
    let ouvrantes = jetons.iter().filter(|j| j.est_ouvrante()).count();
    let fermantes = jetons.iter().filter(|j| j.est_fermante()).count();

    reconnu && !fin_ouverte && ouvrantes == fermantes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::variables::Variable;
    use pretty_assertions::assert_eq;

    fn catalogue() -> Catalogue {
        Catalogue::new(vec![
            Variable::new("@Revenue", "rev").avec_valeur(100.0),
            Variable::new("@Cost", "cost").avec_valeur(40.0),
        ])
        .unwrap()
    }

    fn taper(t: Tampon, frappes: &str, cat: &Catalogue) -> Tampon {
        frappes
            .chars()
            .fold(t, |t, c| t.saisir(c, cat).unwrap_or(t))
    }

    #[test]
    fn saisie_complete_et_evaluation() {
        let cat = catalogue();
        let t = taper(Tampon::vide(), "(@", &cat);
        assert!(t.declencheur_en_attente(&cat));
        assert!(!t.complet);

        let t = t.inserer_variable(0, &cat).unwrap();
        let t = taper(t, "-@", &cat);
        let t = t.inserer_variable(1, &cat).unwrap();
        let t = taper(t, ")/2", &cat);

        assert_eq!(t.affichage, "(@Revenue-@Cost)/2");
        assert_eq!(t.canonique, "(rev-cost)/2");
        assert_eq!(t.curseur, 18);
        assert!(t.complet);
        assert_eq!(t.evaluer(&cat).map(|c| c.valeur), Ok(30.0));
        assert!(t.valider(&cat).valide);
    }

    #[test]
    fn refus_sans_effet() {
        let cat = catalogue();
        let t = Tampon::depuis_affichage("3+", 2, &cat);
        assert_eq!(t.saisir(')', &cat), None);
        assert_eq!(t.saisir('x', &cat), None);
    }

    #[test]
    fn depuis_le_stockage() {
        let cat = catalogue();
        let t = Tampon::depuis_canonique("rev*2", &cat);
        assert_eq!(t.affichage, "@Revenue*2");
        assert_eq!(t.curseur, 10);
        assert!(t.complet);
        let json = serde_json::to_string(&t).unwrap();
        let relu: Tampon = serde_json::from_str(&json).unwrap();
        assert_eq!(relu, t);
    }

    #[test]
    fn navigation_et_effacement() {
        let cat = catalogue();
        let t = Tampon::depuis_canonique("rev+12", &cat);
        let t = t.deplacer(Direction::Gauche, &cat);
        assert_eq!(t.curseur, 9);
        let t = t.deplacer(Direction::Gauche, &cat).deplacer(Direction::Gauche, &cat);
        assert_eq!(t.curseur, 0);
        let t = t.effacer_apres(&cat).unwrap();
        assert_eq!(t.affichage, "+12");
        assert_eq!(t.canonique, "+12");
        assert!(t.evaluer(&cat).is_err());
        // placement au milieu d'une variable : ignoré
        let t = Tampon::depuis_canonique("rev", &cat);
        assert_eq!(t.placer(3, &cat).curseur, 8);
        assert_eq!(t.placer(0, &cat).curseur, 0);
    }

    #[test]
    fn completude() {
        let cat = catalogue();
        assert!(!est_complet("", &cat));
        assert!(!est_complet("3+", &cat));
        assert!(!est_complet("(3", &cat));
        assert!(!est_complet("3*(", &cat));
        assert!(!est_complet("3+@", &cat));
        assert!(est_complet("(3)", &cat));
        assert!(est_complet("@Cost", &cat));
    }
}
