//! src/app/historique.rs
//!
//! Historique annuler / rétablir de la coque (le noyau ne garde aucun historique).
//!
//! Contrats :
//! - `enregistrer` empile l'état AVANT modification et vide la pile "rétablir".
//! - Profondeur bornée : au-delà, l'état le plus ancien est oublié.

use std::collections::VecDeque;

use crate::noyau::Tampon;

/// Profondeur maximale de l'historique.
pub const PROFONDEUR_MAX: usize = 100;

#[derive(Clone, Debug, Default)]
pub struct Historique {
    passe: VecDeque<Tampon>,
    futur: Vec<Tampon>,
}

impl Historique {
    pub fn enregistrer(&mut self, avant: Tampon) {
        if self.passe.back() == Some(&avant) {
            return;
        }
        self.passe.push_back(avant);
        if self.passe.len() > PROFONDEUR_MAX {
            self.passe.pop_front();
        }
        self.futur.clear();
    }

    /// Rend l'état précédent ; `courant` part dans "rétablir".
    pub fn annuler(&mut self, courant: &Tampon) -> Option<Tampon> {
        let precedent = self.passe.pop_back()?;
        self.futur.push(courant.clone());
        Some(precedent)
    }

    pub fn retablir(&mut self, courant: &Tampon) -> Option<Tampon> {
        let suivant = self.futur.pop()?;
        self.passe.push_back(courant.clone());
        Some(suivant)
    }

    pub fn peut_annuler(&self) -> bool {
        !self.passe.is_empty()
    }

    pub fn peut_retablir(&self) -> bool {
        !self.futur.is_empty()
    }
}
