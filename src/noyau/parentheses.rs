// src/noyau/parentheses.rs
//
// Appariement des parenthèses sur la suite de jetons.
// - '(' : empile l'indice du jeton
// - ')' : dépile et apparie (profondeur = taille de la pile après le dépilement,
//         donc celle au moment de l'ouverture), sinon Orpheline
// - restes de pile : Orpheline
//
// Pur : relancé à chaque modification, aucun état entre deux passes.

use super::jetons::{EtatParenthese, Jeton};

/// Renseigne `parenthese` sur chaque jeton parenthèse.
pub fn match_brackets(mut jetons: Vec<Jeton>) -> Vec<Jeton> {
    let mut pile: Vec<usize> = Vec::new();

    for i in 0..jetons.len() {
        if jetons[i].est_ouvrante() {
            pile.push(i);
        } else if jetons[i].est_fermante() {
            match pile.pop() {
                Some(ouvrante) => {
                    let profondeur = pile.len();
                    jetons[ouvrante].parenthese = Some(EtatParenthese::Appariee {
                        profondeur,
                        partenaire: i,
                    });
                    jetons[i].parenthese = Some(EtatParenthese::Appariee {
                        profondeur,
                        partenaire: ouvrante,
                    });
                }
                None => jetons[i].parenthese = Some(EtatParenthese::Orpheline),
            }
        }
    }

    for i in pile {
        jetons[i].parenthese = Some(EtatParenthese::Orpheline);
    }

    jetons
}

/// Indice de couleur = profondeur mod taille de palette (palette vide -> 0).
pub fn indice_couleur(profondeur: usize, taille_palette: usize) -> usize {
    if taille_palette == 0 {
        0
    } else {
        profondeur % taille_palette
    }
}

/// Première parenthèse orpheline dans l'ordre du texte.
pub fn premiere_orpheline(jetons: &[Jeton]) -> Option<&Jeton> {
    jetons
        .iter()
        .find(|j| j.parenthese == Some(EtatParenthese::Orpheline))
}

/// Paire courante : parenthèse appariée qui touche le curseur
/// (celle juste avant, sinon celle juste après). Renvoie (ouvrante, fermante).
pub fn paire_au_curseur(jetons: &[Jeton], curseur: usize) -> Option<(usize, usize)> {
    let touche = |j: &&Jeton| j.fin == curseur || j.debut == curseur;
    let candidats = jetons
        .iter()
        .filter(|j| j.parenthese.is_some())
        .filter(touche);

    // priorité à la parenthèse à gauche du curseur (ordre du texte => dernière trouvée)
    let mut choisi = None;
    for j in candidats {
        if let Some(EtatParenthese::Appariee { partenaire, .. }) = j.parenthese {
            let autre = &jetons[partenaire];
            let paire = if j.est_ouvrante() {
                (j.debut, autre.debut)
            } else {
                (autre.debut, j.debut)
            };
            if j.fin == curseur || choisi.is_none() {
                choisi = Some(paire);
            }
        }
    }
    choisi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::jetons::classify;
    use crate::noyau::variables::Catalogue;
    use pretty_assertions::assert_eq;

    fn etats(texte: &str) -> Vec<Option<EtatParenthese>> {
        match_brackets(classify(texte, &Catalogue::vide()))
            .into_iter()
            .filter(|j| j.genre == crate::noyau::jetons::Genre::Parenthese)
            .map(|j| j.parenthese)
            .collect()
    }

    #[test]
    fn profondeurs_imbriquees() {
        // jetons : ( ( 1 ) + ( 2 ) )
        //          0 1 2 3 4 5 6 7 8
        let e = etats("((1)+(2))");
        assert_eq!(
            e,
            vec![
                Some(EtatParenthese::Appariee { profondeur: 0, partenaire: 8 }),
                Some(EtatParenthese::Appariee { profondeur: 1, partenaire: 3 }),
                Some(EtatParenthese::Appariee { profondeur: 1, partenaire: 1 }),
                Some(EtatParenthese::Appariee { profondeur: 1, partenaire: 7 }),
                Some(EtatParenthese::Appariee { profondeur: 1, partenaire: 5 }),
                Some(EtatParenthese::Appariee { profondeur: 0, partenaire: 0 }),
            ]
        );
    }

    #[test]
    fn orphelines() {
        let e = etats(")(1");
        assert_eq!(e, vec![Some(EtatParenthese::Orpheline), Some(EtatParenthese::Orpheline)]);

        let jetons = match_brackets(classify("3+(4*2", &Catalogue::vide()));
        assert_eq!(premiere_orpheline(&jetons).map(|j| j.debut), Some(2));
    }

    #[test]
    fn couleur_cyclique() {
        assert_eq!(indice_couleur(0, 5), 0);
        assert_eq!(indice_couleur(7, 5), 2);
        assert_eq!(indice_couleur(3, 0), 0);
    }

    #[test]
    fn paire_courante() {
        let jetons = match_brackets(classify("2*(3+(4))", &Catalogue::vide()));
        // curseur juste après le '(' externe
        assert_eq!(paire_au_curseur(&jetons, 3), Some((2, 8)));
        // curseur entre "))" : la parenthèse de gauche l'emporte
        assert_eq!(paire_au_curseur(&jetons, 8), Some((5, 7)));
        assert_eq!(paire_au_curseur(&jetons, 0), None);
    }
}
