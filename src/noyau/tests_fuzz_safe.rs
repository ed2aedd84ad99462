//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler l'éditeur frappe par frappe sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - longueur de session bornée
//! - budget temps global
//! - invariants vérifiés après CHAQUE opération :
//!   * jamais plus de ')' que de '('
//!   * curseur dans [0, len]
//!   * canonique == to_canonical(affichage) et aller-retour affichage/canonique
//!   * refus => tampon inchangé
//!   * évaluation / validation sans panique, cohérentes entre elles

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::curseur::Direction;
use super::eval::evaluate;
use super::tampon::Tampon;
use super::variables::{to_canonical, to_display, Catalogue, Variable};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn catalogue() -> Catalogue {
    Catalogue::new(vec![
        Variable::new("@Revenue", "rev").avec_valeur(1250.0),
        Variable::new("@RevenueNet", "revnet").avec_valeur(980.5),
        Variable::new("@Cost", "c1").avec_valeur(0.0),
        Variable::new("@收入", "income").avec_valeur(-3.25),
    ])
    .unwrap()
}

/// Une opération de session : frappe, variable, déplacement, effacement.
#[derive(Clone, Copy, Debug)]
enum Op {
    Frappe(char),
    Variable(usize),
    Gauche,
    Droite,
    Retour,
    Suppr,
}

const FRAPPES: &[char] = &[
    '0', '1', '2', '5', '9', '.', '+', '-', '*', '/', '(', ')', '(', ')', '@', 'x', ' ', '%',
];

fn gen_op(rng: &mut Rng, cat: &Catalogue) -> Op {
    match rng.pick(12) {
        0..=5 => Op::Frappe(FRAPPES[rng.pick(FRAPPES.len() as u32) as usize]),
        6 => Op::Variable(rng.pick(cat.variables().len() as u32 + 1) as usize),
        7 => Op::Gauche,
        8 => Op::Droite,
        9 => Op::Retour,
        10 => Op::Suppr,
        _ => Op::Frappe('-'),
    }
}

fn appliquer(t: &Tampon, op: Op, cat: &Catalogue) -> Option<Tampon> {
    match op {
        Op::Frappe(c) => t.saisir(c, cat),
        Op::Variable(i) => t.inserer_variable(i, cat),
        Op::Gauche => Some(t.deplacer(Direction::Gauche, cat)),
        Op::Droite => Some(t.deplacer(Direction::Droite, cat)),
        Op::Retour => t.effacer_avant(cat),
        Op::Suppr => t.effacer_apres(cat),
    }
}

fn check_invariants(t: &Tampon, cat: &Catalogue, trace: &[Op]) {
    let ouvrantes = t.affichage.matches('(').count();
    let fermantes = t.affichage.matches(')').count();
    assert!(fermantes <= ouvrantes, "parenthèses: {:?} après {trace:?}", t.affichage);

    assert!(t.curseur <= t.longueur(), "curseur hors bornes: {t:?}");

    assert_eq!(t.canonique, to_canonical(&t.affichage, cat), "canonique désynchronisé");
    assert_eq!(
        to_canonical(&to_display(&t.canonique, cat), cat),
        t.canonique,
        "aller-retour cassé après {trace:?}"
    );

    // évaluer n'a de sens que complet ; validation et évaluation doivent s'accorder
    let valeur = evaluate(&t.canonique, cat, &cat.valeurs());
    if valeur.is_some() {
        assert!(t.complet, "évalué mais pas complet: {t:?}");
        assert!(t.valider(cat).valide, "évalué mais invalide: {t:?}");
    }
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_sessions_de_frappe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1500);

    let cat = catalogue();
    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut acceptees = 0usize;
    let mut refusees = 0usize;
    let mut evaluees = 0usize;

    for _ in 0..150 {
        budget(t0, max);

        let mut t = Tampon::vide();
        let mut trace = Vec::new();

        for _ in 0..40 {
            let op = gen_op(&mut rng, &cat);
            trace.push(op);
            match appliquer(&t, op, &cat) {
                Some(suivant) => {
                    t = suivant;
                    acceptees += 1;
                }
                None => refusees += 1,
            }
            check_invariants(&t, &cat, &trace);
        }

        if evaluate(&t.canonique, &cat, &cat.valeurs()).is_some() {
            evaluees += 1;
        }
    }

    // On veut voir un mix, sinon le fuzz ne “balaye” rien.
    assert!(acceptees > 1000, "trop peu de frappes acceptées: {acceptees}");
    assert!(refusees > 100, "aucun refus vu: fuzz trop “sage”");
    assert!(evaluees > 0, "aucune formule évaluable en fin de session");
}

#[test]
fn fuzz_safe_determinisme() {
    let cat = catalogue();
    let session = |seed: u64| {
        let mut rng = Rng::new(seed);
        let mut t = Tampon::vide();
        for _ in 0..200 {
            let op = gen_op(&mut rng, &cat);
            if let Some(s) = appliquer(&t, op, &cat) {
                t = s;
            }
        }
        t
    };
    assert_eq!(session(0xBADC0DE_u64), session(0xBADC0DE_u64));
}

#[test]
fn fuzz_safe_curseurs_arbitraires() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let cat = catalogue();
    let mut rng = Rng::new(0x5EED_u64);

    for texte in ["", "@Revenue*(2-@收入)", "3.5/(", "x@@)", "((1)+@RevenueNet"] {
        for _ in 0..60 {
            budget(t0, max);
            let curseur = rng.pick(30) as usize;
            let c = FRAPPES[rng.pick(FRAPPES.len() as u32) as usize];
            let a = super::saisie::admit(texte, c, curseur, &cat);
            if !a.acceptee {
                assert_eq!((a.texte.as_str(), a.curseur), (texte, curseur));
            } else {
                assert!(a.curseur <= a.texte.chars().count());
            }
        }
    }
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let expr = somme_balancee("0.5", 800);
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(evaluate(&expr, &Catalogue::vide(), &HashMap::new()), Some(400.0));
}

#[test]
fn fuzz_safe_imbrication_profonde() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    // piles seulement : 5000 niveaux ne doivent pas faire déborder quoi que ce soit
    let n = 5000;
    let expr = format!("{}1{}", "(".repeat(n), ")".repeat(n));
    budget(t0, max);
    assert_eq!(evaluate(&expr, &Catalogue::vide(), &HashMap::new()), Some(1.0));

    let negations = format!("{}7", "-(".repeat(n)) + &")".repeat(n);
    assert_eq!(evaluate(&negations, &Catalogue::vide(), &HashMap::new()), Some(7.0));
}
