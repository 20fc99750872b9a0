// ============================================================================
// Surface de dessin abstraite
// ============================================================================
// Le moteur de rendu ne connaît que ce trait : chemins (move_to / line_to +
// stroke), disques pleins et texte aligné. Coordonnées en unités de surface,
// origine en haut à gauche, y vers le bas.
//
// DrawList est l'implémentation "enregistreuse" : elle garde la liste des
// commandes. Utilisée par les tests et par l'UI, qui rejoue la liste sur un
// Canvas ratatui.
// ============================================================================

use ratatui::style::Color;

/// Ancrage horizontal d'un texte par rapport à son x
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Primitives de dessin nécessaires au graphique
pub trait DrawingSurface {
    /// Efface toute la surface
    fn clear(&mut self);

    /// Commence un nouveau sous-chemin en (x, y)
    fn move_to(&mut self, x: f64, y: f64);

    /// Prolonge le chemin courant jusqu'à (x, y)
    fn line_to(&mut self, x: f64, y: f64);

    /// Trace le chemin courant puis le vide
    fn stroke(&mut self, color: Color, width: f64);

    /// Disque plein centré en (x, y)
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color);

    /// Texte ancré en (x, y) selon `align`
    fn fill_text(&mut self, text: &str, x: f64, y: f64, align: TextAlign, color: Color);
}

/// Segment de droite d'un chemin tracé
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Une commande enregistrée
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Chemin tracé : suite de segments d'une même couleur
    Stroke {
        segments: Vec<Segment>,
        color: Color,
        width: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        align: TextAlign,
        color: Color,
    },
}

/// Surface qui enregistre les commandes au lieu de les dessiner
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    path: Vec<Segment>,
    cursor: Option<(f64, f64)>,
    clears: usize,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commandes depuis le dernier `clear()`
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Nombre de `clear()` reçus
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Disques dessinés : (x, y, rayon, couleur)
    pub fn circles(&self) -> Vec<(f64, f64, f64, Color)> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                DrawCommand::Circle {
                    x,
                    y,
                    radius,
                    color,
                } => Some((x, y, radius, color)),
                _ => None,
            })
            .collect()
    }

    /// Textes dessinés, dans l'ordre
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Tous les segments tracés dans une couleur donnée
    pub fn segments(&self, color: Color) -> Vec<Segment> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Stroke {
                    segments,
                    color: c,
                    ..
                } if *c == color => Some(segments.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

impl DrawingSurface for DrawList {
    fn clear(&mut self) {
        self.commands.clear();
        self.path.clear();
        self.cursor = None;
        self.clears += 1;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.cursor = Some((x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        // line_to sans point de départ agit comme move_to
        if let Some((x1, y1)) = self.cursor {
            self.path.push(Segment { x1, y1, x2: x, y2: y });
        }
        self.cursor = Some((x, y));
    }

    fn stroke(&mut self, color: Color, width: f64) {
        let segments = std::mem::take(&mut self.path);
        self.cursor = None;
        if !segments.is_empty() {
            self.commands.push(DrawCommand::Stroke {
                segments,
                color,
                width,
            });
        }
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) {
        self.commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, align: TextAlign, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            align,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_is_consumed_by_stroke() {
        let mut list = DrawList::new();
        list.move_to(0.0, 0.0);
        list.line_to(10.0, 0.0);
        list.line_to(10.0, 5.0);
        list.stroke(Color::Red, 1.0);
        list.stroke(Color::Red, 1.0);

        assert_eq!(list.commands().len(), 1);
        assert_eq!(
            list.segments(Color::Red),
            vec![
                Segment { x1: 0.0, y1: 0.0, x2: 10.0, y2: 0.0 },
                Segment { x1: 10.0, y1: 0.0, x2: 10.0, y2: 5.0 },
            ]
        );
    }

    #[test]
    fn test_line_to_without_move_to_starts_path() {
        let mut list = DrawList::new();
        list.line_to(3.0, 3.0);
        list.line_to(4.0, 4.0);
        list.stroke(Color::Blue, 1.0);

        assert_eq!(list.segments(Color::Blue).len(), 1);
    }

    #[test]
    fn test_clear_resets_commands() {
        let mut list = DrawList::new();
        list.fill_circle(1.0, 2.0, 5.0, Color::Green);
        list.fill_text("a", 0.0, 0.0, TextAlign::Left, Color::White);
        list.clear();

        assert!(list.commands().is_empty());
        assert_eq!(list.clear_count(), 1);
    }

    #[test]
    fn test_accessors() {
        let mut list = DrawList::new();
        list.fill_circle(1.0, 2.0, 5.0, Color::Green);
        list.fill_text("x", 0.0, 0.0, TextAlign::Center, Color::White);

        assert_eq!(list.circles(), vec![(1.0, 2.0, 5.0, Color::Green)]);
        assert_eq!(list.texts(), vec!["x"]);
    }
}
