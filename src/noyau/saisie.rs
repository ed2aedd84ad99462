// src/noyau/saisie.rs
//
// Contrôle d'admission : une frappe -> accepter / transformer / refuser.
// - tout l'état vient du texte et du curseur (positions en caractères)
// - un refus rend le texte et le curseur tels quels
// - jamais de panique, quel que soit le curseur reçu
//
// Règles (contexte = ce qui précède le curseur) :
//   chiffre     : inséré ; '*' intercalé s'il touche une variable
//   '.'         : refusé si la suite chiffres/points autour en contient déjà un ;
//                 "0." si rien avant
//   opérateur   : au début ou après '(' seul '-' passe ;
//                 après un opérateur, '-' s'ajoute, les autres remplacent la suite
//   '('         : au début, après opérateur, '(' ou opérande complet
//   ')'         : jamais plus de ')' que de '(' ; jamais après opérateur, '(', '.', déclencheur
//   déclencheur : partout où une variable peut venir ; pas après '.' ni un autre déclencheur
//   hors chiffre et '.', rien ne s'insère juste devant un '.' (le nombre perdrait son chiffre de tête)

use super::alphabet::est_operateur;
use super::jetons::{classify, EtatParenthese, Genre, Jeton};
use super::parentheses::match_brackets;
use super::variables::{to_canonical, to_display, Catalogue};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Admission {
    pub acceptee: bool,
    pub texte: String,
    pub curseur: usize,
}

impl Admission {
    fn refus(texte: &str, curseur: usize) -> Self {
        Self {
            acceptee: false,
            texte: texte.to_string(),
            curseur,
        }
    }
}

/// Ce qui précède immédiatement le curseur.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Avant {
    Debut,
    Chiffre,
    Point,
    Operateur,
    Ouvrante,
    Fermante,
    Variable,
    Declencheur,
    Autre,
}

/// Texte découpé + jetons, curseur borné à [0, len].
struct Contexte {
    chars: Vec<char>,
    jetons: Vec<Jeton>,
    pos: usize,
}

impl Contexte {
    /// None si le curseur est strictement à l'intérieur d'une variable.
    fn new(texte: &str, curseur: usize, catalogue: &Catalogue) -> Option<Self> {
        let chars: Vec<char> = texte.chars().collect();
        let pos = curseur.min(chars.len());
        let jetons = classify(texte, catalogue);
        let dedans = jetons
            .iter()
            .any(|j| j.genre == Genre::Variable && j.debut < pos && pos < j.fin);
        if dedans {
            return None;
        }
        Some(Self { chars, jetons, pos })
    }

    fn jeton_en(&self, position: usize) -> Option<&Jeton> {
        self.jetons.iter().find(|j| j.contient(position))
    }

    fn avant(&self) -> Avant {
        if self.pos == 0 {
            return Avant::Debut;
        }
        match self.jeton_en(self.pos - 1).map(|j| j.genre) {
            Some(Genre::Variable) => return Avant::Variable,
            Some(Genre::Declencheur) => return Avant::Declencheur,
            _ => {}
        }
        match self.chars[self.pos - 1] {
            c if c.is_ascii_digit() => Avant::Chiffre,
            '.' => Avant::Point,
            '(' => Avant::Ouvrante,
            ')' => Avant::Fermante,
            c if est_operateur(c) => Avant::Operateur,
            _ => Avant::Autre,
        }
    }

    fn point_apres(&self) -> bool {
        self.chars.get(self.pos) == Some(&'.')
    }

    fn variable_apres(&self) -> bool {
        self.jeton_en(self.pos)
            .is_some_and(|j| j.genre == Genre::Variable && j.debut == self.pos)
    }

    /// Remplace [debut, fin) par `insertion` ; curseur = debut + `avance`.
    fn remplacer(&self, debut: usize, fin: usize, insertion: &str, avance: usize) -> Admission {
        let mut texte: String = self.chars[..debut].iter().collect();
        texte.push_str(insertion);
        texte.extend(&self.chars[fin..]);
        Admission {
            acceptee: true,
            texte,
            curseur: debut + avance,
        }
    }

    fn inserer(&self, insertion: &str) -> Admission {
        self.remplacer(self.pos, self.pos, insertion, insertion.chars().count())
    }

    /// Insertion numérique : '*' intercalé contre une variable voisine
    /// (sinon le nombre prolongerait le nom ou le code).
    fn inserer_nombre(&self, nombre: &str) -> Admission {
        let prefixe = if self.avant() == Avant::Variable { "*" } else { "" };
        let suffixe = if self.variable_apres() { "*" } else { "" };
        let insertion = format!("{prefixe}{nombre}{suffixe}");
        let avance = prefixe.len() + nombre.chars().count();
        self.remplacer(self.pos, self.pos, &insertion, avance)
    }

    fn compte(&self, c: char, jusqua: usize) -> usize {
        self.chars[..jusqua].iter().filter(|&&x| x == c).count()
    }
}

/// Admet (ou non) la frappe `c` au curseur dans le texte d'affichage.
pub fn admit(texte: &str, c: char, curseur: usize, catalogue: &Catalogue) -> Admission {
    let decision = Contexte::new(texte, curseur, catalogue).and_then(|ctx| {
        if c.is_ascii_digit() {
            Some(ctx.inserer_nombre(&c.to_string()))
        } else if c == '.' {
            point(&ctx)
        } else if ctx.point_apres() {
            None
        } else if est_operateur(c) {
            operateur(&ctx, c)
        } else if c == '(' {
            ouvrante(&ctx)
        } else if c == ')' {
            fermante(&ctx)
        } else if c == catalogue.declencheur() {
            declencheur(&ctx, c)
        } else {
            None
        }
    });

    decision.unwrap_or_else(|| {
        tracing::trace!(caractere = %c, curseur, "frappe refusée");
        Admission::refus(texte, curseur)
    })
}

fn point(ctx: &Contexte) -> Option<Admission> {
    let avant = ctx.avant();
    if matches!(avant, Avant::Declencheur) || ctx.variable_apres() {
        return None;
    }

    let numerique = |c: char| c.is_ascii_digit() || c == '.';
    let mut debut = ctx.pos;
    while debut > 0 && numerique(ctx.chars[debut - 1]) {
        debut -= 1;
    }
    let mut fin = ctx.pos;
    while fin < ctx.chars.len() && numerique(ctx.chars[fin]) {
        fin += 1;
    }
    if ctx.chars[debut..fin].contains(&'.') {
        return None;
    }

    if debut == ctx.pos {
        Some(ctx.inserer_nombre("0."))
    } else {
        Some(ctx.inserer("."))
    }
}

fn operateur(ctx: &Contexte, c: char) -> Option<Admission> {
    match ctx.avant() {
        Avant::Debut | Avant::Ouvrante => (c == '-').then(|| ctx.inserer("-")),
        Avant::Operateur => {
            let mut debut = ctx.pos;
            while debut > 0 && est_operateur(ctx.chars[debut - 1]) {
                debut -= 1;
            }
            let apres_rien = debut == 0 || ctx.chars[debut - 1] == '(';

            if c == '-' {
                Some(ctx.inserer("-"))
            } else if apres_rien {
                None
            } else {
                Some(ctx.remplacer(debut, ctx.pos, &c.to_string(), 1))
            }
        }
        Avant::Point | Avant::Declencheur => None,
        Avant::Chiffre | Avant::Fermante | Avant::Variable | Avant::Autre => {
            Some(ctx.inserer(&c.to_string()))
        }
    }
}

fn ouvrante(ctx: &Contexte) -> Option<Admission> {
    match ctx.avant() {
        Avant::Debut
        | Avant::Operateur
        | Avant::Ouvrante
        | Avant::Chiffre
        | Avant::Fermante
        | Avant::Variable => Some(ctx.inserer("(")),
        Avant::Point | Avant::Declencheur | Avant::Autre => None,
    }
}

fn fermante(ctx: &Contexte) -> Option<Admission> {
    let total = ctx.chars.len();
    if ctx.compte(')', total) >= ctx.compte('(', total) {
        return None;
    }
    // il faut une '(' encore ouverte avant le curseur
    if ctx.compte('(', ctx.pos) <= ctx.compte(')', ctx.pos) {
        return None;
    }
    match ctx.avant() {
        Avant::Chiffre | Avant::Fermante | Avant::Variable => Some(ctx.inserer(")")),
        Avant::Debut
        | Avant::Operateur
        | Avant::Ouvrante
        | Avant::Point
        | Avant::Declencheur
        | Avant::Autre => None,
    }
}

fn declencheur(ctx: &Contexte, c: char) -> Option<Admission> {
    match ctx.avant() {
        Avant::Point | Avant::Declencheur | Avant::Autre => None,
        _ => Some(ctx.inserer(&c.to_string())),
    }
}

/* ------------------------ Variable choisie dans le sélecteur ------------------------ */

/// Insère le nom de la variable `index` au curseur.
/// - un déclencheur en attente juste avant le curseur est remplacé ;
/// - '*' avant si le texte précédent finit par un chiffre, ')' ou une variable ;
/// - '*' après si le texte suivant commence par un chiffre, '(' ou une variable.
///
/// Curseur rendu juste après le nom.
pub fn insert_variable(texte: &str, curseur: usize, index: usize, catalogue: &Catalogue) -> Admission {
    let refus = || {
        tracing::trace!(index, curseur, "insertion de variable refusée");
        Admission::refus(texte, curseur)
    };

    let Some(variable) = catalogue.get(index) else {
        return refus();
    };
    let Some(ctx) = Contexte::new(texte, curseur, catalogue) else {
        return refus();
    };

    // retire le déclencheur en attente puis recalcule le contexte
    let ctx = if ctx.avant() == Avant::Declencheur {
        let sans: String = ctx.chars[..ctx.pos - 1]
            .iter()
            .chain(&ctx.chars[ctx.pos..])
            .collect();
        match Contexte::new(&sans, ctx.pos - 1, catalogue) {
            Some(c) => c,
            None => return refus(),
        }
    } else {
        ctx
    };

    if ctx.point_apres() {
        return refus();
    }

    let prefixe = match ctx.avant() {
        Avant::Point | Avant::Autre => return refus(),
        Avant::Chiffre | Avant::Fermante | Avant::Variable => "*",
        Avant::Debut | Avant::Operateur | Avant::Ouvrante | Avant::Declencheur => "",
    };
    let suivant = ctx.chars.get(ctx.pos).copied();
    let suffixe = match suivant {
        Some(c) if c.is_ascii_digit() || c == '(' => "*",
        _ if ctx.variable_apres() => "*",
        _ => "",
    };

    let insertion = format!("{prefixe}{}{suffixe}", variable.nom);
    let avance = prefixe.len() + variable.nom.chars().count();
    ctx.remplacer(ctx.pos, ctx.pos, &insertion, avance)
}

/* ------------------------ Effacement ------------------------ */

/// Retour arrière : variable entière si le curseur la touche par la droite ;
/// une '(' appariée emporte sa ')'.
pub fn delete_backward(texte: &str, curseur: usize, catalogue: &Catalogue) -> Admission {
    let chars: Vec<char> = texte.chars().collect();
    let pos = curseur.min(chars.len());
    if pos == 0 {
        return Admission::refus(texte, curseur);
    }
    effacer(texte, &chars, pos - 1, curseur, catalogue)
}

/// Suppression vers l'avant (même règles, côté droit du curseur).
pub fn delete_forward(texte: &str, curseur: usize, catalogue: &Catalogue) -> Admission {
    let chars: Vec<char> = texte.chars().collect();
    let pos = curseur.min(chars.len());
    if pos >= chars.len() {
        return Admission::refus(texte, curseur);
    }
    effacer(texte, &chars, pos, curseur, catalogue)
}

/// Efface l'unité qui contient le caractère `cible`.
fn effacer(
    texte: &str,
    chars: &[char],
    cible: usize,
    curseur: usize,
    catalogue: &Catalogue,
) -> Admission {
    let jetons = match_brackets(classify(texte, catalogue));
    let Some(jeton) = jetons.iter().find(|j| j.contient(cible)) else {
        return Admission::refus(texte, curseur);
    };

    let mut retirer: Vec<(usize, usize)> = match jeton.genre {
        Genre::Variable => vec![(jeton.debut, jeton.fin)],
        _ => vec![(cible, cible + 1)],
    };
    if jeton.est_ouvrante() {
        if let Some(EtatParenthese::Appariee { partenaire, .. }) = jeton.parenthese {
            let fermante = &jetons[partenaire];
            retirer.push((fermante.debut, fermante.fin));
        }
    }

    let garde = |i: &usize| !retirer.iter().any(|&(d, f)| d <= *i && *i < f);
    let nouveau: String = (0..chars.len())
        .filter(garde)
        .map(|i| chars[i])
        .collect();

    // refus si l'effacement colle deux unités au point de défaire une variable
    // ("@A*2" -> "@A2") ou d'en fusionner les codes ("@A*@B" -> "ab")
    let attendues = jetons.iter().filter(|j| j.genre == Genre::Variable).count()
        - usize::from(jeton.genre == Genre::Variable);
    let restantes = classify(&nouveau, catalogue)
        .iter()
        .filter(|j| j.genre == Genre::Variable)
        .count();
    let fidele = to_display(&to_canonical(&nouveau, catalogue), catalogue) == nouveau;
    let point_isole = points_sans_chiffre(&nouveau) > points_sans_chiffre(texte);
    if restantes != attendues || !fidele || point_isole {
        tracing::trace!(curseur, "effacement refusé");
        return Admission::refus(texte, curseur);
    }

    Admission {
        acceptee: true,
        texte: nouveau,
        curseur: retirer[0].0,
    }
}

/// Points qui ne suivent pas un chiffre (".5", "3+.5").
fn points_sans_chiffre(texte: &str) -> usize {
    let chars: Vec<char> = texte.chars().collect();
    (0..chars.len())
        .filter(|&i| chars[i] == '.' && (i == 0 || !chars[i - 1].is_ascii_digit()))
        .count()
}
