//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : tenir le tampon courant, le catalogue, l'historique et les sorties
//! (aperçu, validation, démarche), et offrir les actions que la vue déclenche.
//!
//! Contrats :
//! - Toute modification du texte passe par le noyau (`Tampon`), jamais d'édition directe.
//! - Une action refusée ne touche ni au tampon ni à l'historique.
//! - Les sorties sont recalculées après chaque changement accepté.

use std::path::PathBuf;

use crate::noyau::eval::{Calcul, Demarche};
use crate::noyau::{filtrer, Catalogue, Direction, Tampon, Validation, Variable};

use super::historique::Historique;
use super::reglages::{Reglages, ReglagesErreur};

pub struct AppFormule {
    // --- édition ---
    pub tampon: Tampon,
    pub catalogue: Catalogue,
    pub historique: Historique,

    // --- sorties ---
    pub apercu: Option<String>, // valeur arrondie (texte), None si non évaluable
    pub erreur: String,         // cause de l'échec du dernier calcul
    pub validation: Option<Validation>,
    pub demarche: Demarche,

    // --- sélecteur de variables ---
    pub recherche: String,

    // --- barre d'état (enregistrement) ---
    pub statut: String,

    // --- paramètres ---
    pub reglages: Reglages,
    pub chemin_reglages: Option<PathBuf>,
}

impl AppFormule {
    pub fn new(reglages: Reglages, chemin_reglages: Option<PathBuf>) -> Self {
        let catalogue = reglages.catalogue_ou_vide();
        let tampon = match &reglages.formule_initiale {
            Some(f) => Tampon::depuis_canonique(f, &catalogue),
            None => Tampon::vide(),
        };

        let mut app = Self {
            tampon,
            catalogue,
            historique: Historique::default(),
            apercu: None,
            erreur: String::new(),
            validation: None,
            demarche: Demarche::default(),
            recherche: String::new(),
            statut: String::new(),
            reglages,
            chemin_reglages,
        };
        app.rafraichir();
        app
    }

    /* ------------------------ Actions d'édition ------------------------ */

    /// Remplace le tampon si l'opération a été acceptée ; rend `true` dans ce cas.
    fn remplacer(&mut self, suivant: Option<Tampon>) -> bool {
        let Some(suivant) = suivant else {
            return false;
        };
        if suivant == self.tampon {
            return true;
        }
        let avant = std::mem::replace(&mut self.tampon, suivant);
        self.historique.enregistrer(avant);
        self.validation = None;
        self.rafraichir();
        true
    }

    pub fn saisir(&mut self, c: char) -> bool {
        let suivant = self.tampon.saisir(c, &self.catalogue);
        let ok = self.remplacer(suivant);
        if ok && c == self.catalogue.declencheur() {
            self.recherche.clear();
        }
        ok
    }

    pub fn inserer_variable(&mut self, index: usize) -> bool {
        let suivant = self.tampon.inserer_variable(index, &self.catalogue);
        self.remplacer(suivant)
    }

    pub fn effacer_avant(&mut self) -> bool {
        let suivant = self.tampon.effacer_avant(&self.catalogue);
        self.remplacer(suivant)
    }

    pub fn effacer_apres(&mut self) -> bool {
        let suivant = self.tampon.effacer_apres(&self.catalogue);
        self.remplacer(suivant)
    }

    /// Déplacements : pas d'entrée d'historique.
    pub fn deplacer(&mut self, direction: Direction) {
        self.tampon = self.tampon.deplacer(direction, &self.catalogue);
    }

    pub fn debut(&mut self) {
        self.tampon = self.tampon.placer(0, &self.catalogue);
    }

    pub fn fin(&mut self) {
        let fin = self.tampon.longueur();
        self.tampon = self.tampon.placer(fin, &self.catalogue);
    }

    pub fn annuler(&mut self) {
        if let Some(t) = self.historique.annuler(&self.tampon) {
            self.tampon = t;
            self.validation = None;
            self.rafraichir();
        }
    }

    pub fn retablir(&mut self) {
        if let Some(t) = self.historique.retablir(&self.tampon) {
            self.tampon = t;
            self.validation = None;
            self.rafraichir();
        }
    }

    /// Échap / bouton C : formule vide (annulable).
    pub fn effacer_tout(&mut self) {
        self.remplacer(Some(Tampon::vide()));
    }

    /// Entrée : validation complète + calcul.
    pub fn valider(&mut self) {
        let v = self.tampon.valider(&self.catalogue);
        tracing::debug!(valide = v.valide, message = %v.message, "validation");
        self.validation = Some(v);
        self.calculer();
    }

    /* ------------------------ Sorties ------------------------ */

    fn rafraichir(&mut self) {
        if self.reglages.apercu_direct {
            self.calculer();
        } else {
            self.apercu = None;
            self.erreur.clear();
            self.demarche = Demarche::default();
        }
    }

    fn calculer(&mut self) {
        match self.tampon.evaluer(&self.catalogue) {
            Ok(Calcul { texte, demarche, .. }) => {
                self.apercu = Some(texte);
                self.erreur.clear();
                self.demarche = demarche;
            }
            Err(e) => {
                self.apercu = None;
                self.erreur = e.to_string();
                self.demarche = Demarche::default();
            }
        }
    }

    /* ------------------------ Sélecteur ------------------------ */

    pub fn selecteur_ouvert(&self) -> bool {
        self.tampon.declencheur_en_attente(&self.catalogue)
    }

    pub fn variables_filtrees(&self) -> Vec<(usize, &Variable)> {
        filtrer(&self.recherche, &self.catalogue)
    }

    /* ------------------------ Persistance ------------------------ */

    /// Enregistre la formule courante comme formule de départ.
    pub fn enregistrer_formule(&mut self) -> Result<(), ReglagesErreur> {
        let Some(chemin) = &self.chemin_reglages else {
            return Err(ReglagesErreur::SansFichier);
        };
        self.reglages.formule_initiale = Some(self.tampon.canonique.clone());
        self.reglages.ecrire(chemin)
    }
}
