//! Persona module - the synthetic interview subjects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Oldest age accepted for a synthesized persona
pub const MAX_PERSONA_AGE: u32 = 120;

/// A synthetic customer persona
///
/// Personas are immutable once created. Identity is positional within the
/// owning [`PersonaSet`]; two personas may share every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Name of the customer
    pub name: String,

    /// Occupation of the customer
    pub occupation: String,

    /// Customer's age in years
    pub age: u32,

    /// Focus, concerns, and motives of the customer
    pub description: String,
}

impl Persona {
    /// Create a new persona
    pub fn new(
        name: impl Into<String>,
        occupation: impl Into<String>,
        age: u32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            occupation: occupation.into(),
            age,
            description: description.into(),
        }
    }

    /// Render the persona as the profile block consumed by prompts
    ///
    /// # Examples
    ///
    /// ```
    /// use parley_domain::Persona;
    ///
    /// let persona = Persona::new("Jake", "Snowboarder", 28, "Wants durable bindings");
    /// let text = persona.profile_text();
    /// assert!(text.starts_with("Name: Jake\n"));
    /// assert!(text.contains("Age: 28"));
    /// ```
    pub fn profile_text(&self) -> String {
        format!(
            "Name: {}\nOccupation: {}\nAge: {}\nDescription: {}\n",
            self.name, self.occupation, self.age, self.description
        )
    }

    /// Check that every field carries usable content
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is empty".to_string());
        }
        if self.occupation.trim().is_empty() {
            return Err("occupation is empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description is empty".to_string());
        }
        if self.age == 0 || self.age > MAX_PERSONA_AGE {
            return Err(format!("age {} out of range [1, {}]", self.age, MAX_PERSONA_AGE));
        }
        Ok(())
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.occupation, self.age)
    }
}

/// An ordered, validated set of personas
///
/// Produced atomically: either every persona is valid and the set has the
/// requested size, or no set is produced at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaSet {
    personas: Vec<Persona>,
}

impl PersonaSet {
    /// Build a persona set that must contain exactly `expected` valid personas
    pub fn new(personas: Vec<Persona>, expected: usize) -> Result<Self, String> {
        if personas.len() != expected {
            return Err(format!(
                "expected {} personas, got {}",
                expected,
                personas.len()
            ));
        }
        for (idx, persona) in personas.iter().enumerate() {
            persona
                .validate()
                .map_err(|e| format!("persona {} is invalid: {}", idx, e))?;
        }
        Ok(Self { personas })
    }

    /// Number of personas in the set
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// Get the persona at a position
    pub fn get(&self, index: usize) -> Option<&Persona> {
        self.personas.get(index)
    }

    /// Iterate over the personas in order
    pub fn iter(&self) -> std::slice::Iter<'_, Persona> {
        self.personas.iter()
    }

    /// Borrow the personas as a slice
    pub fn as_slice(&self) -> &[Persona] {
        &self.personas
    }
}

impl<'a> IntoIterator for &'a PersonaSet {
    type Item = &'a Persona;
    type IntoIter = std::slice::Iter<'a, Persona>;

    fn into_iter(self) -> Self::IntoIter {
        self.personas.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(name: &str) -> Persona {
        Persona::new(name, "Engineer", 34, "Cares about reliability")
    }

    #[test]
    fn test_profile_text_layout() {
        let text = persona("Ada").profile_text();
        assert_eq!(
            text,
            "Name: Ada\nOccupation: Engineer\nAge: 34\nDescription: Cares about reliability\n"
        );
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let mut p = persona("Ada");
        p.occupation = "   ".to_string();
        assert!(p.validate().is_err());

        let mut p = persona("Ada");
        p.age = 0;
        assert!(p.validate().is_err());

        let mut p = persona("Ada");
        p.age = 200;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_set_requires_exact_count() {
        let personas = vec![persona("A"), persona("B")];
        assert!(PersonaSet::new(personas.clone(), 3).is_err());
        let set = PersonaSet::new(personas, 2).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().name, "B");
    }

    #[test]
    fn test_set_is_all_or_nothing() {
        let mut bad = persona("B");
        bad.name = String::new();
        let result = PersonaSet::new(vec![persona("A"), bad], 2);
        assert!(result.unwrap_err().contains("persona 1"));
    }
}
