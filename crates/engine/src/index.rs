use insights_protocol::Realm;
use std::collections::HashMap;

/// Dense integer ids for the tags and features of a realm.
///
/// Ids follow the sorted order of names, so the same realm always
/// produces the same ids.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    features: Vec<String>,
    feature_ids: HashMap<String, usize>,
    feature_tags: Vec<usize>,
    tags: Vec<String>,
    tag_ids: HashMap<String, usize>,
}

impl FeatureIndex {
    /// Builds the index. Features whose tag is missing from the realm map to
    /// a tag id appended after the declared ones; `Realm::validate` rejects
    /// such realms before they get here.
    pub fn build(realm: &Realm) -> Self {
        let mut index = Self::default();
        for name in realm.tags.keys() {
            index.intern_tag(name);
        }
        for (name, feature) in &realm.features {
            let tag = index.intern_tag(&feature.tag);
            index.feature_ids.insert(name.clone(), index.features.len());
            index.features.push(name.clone());
            index.feature_tags.push(tag);
        }
        index
    }

    fn intern_tag(&mut self, name: &str) -> usize {
        if let Some(&id) = self.tag_ids.get(name) {
            return id;
        }
        let id = self.tags.len();
        self.tag_ids.insert(name.to_string(), id);
        self.tags.push(name.to_string());
        id
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn feature_id(&self, name: &str) -> Option<usize> {
        self.feature_ids.get(name).copied()
    }

    pub fn feature_name(&self, id: usize) -> &str {
        &self.features[id]
    }

    pub fn tag_id(&self, name: &str) -> Option<usize> {
        self.tag_ids.get(name).copied()
    }

    pub fn tag_name(&self, id: usize) -> &str {
        &self.tags[id]
    }

    /// Tag id of a feature.
    pub fn tag_of(&self, feature: usize) -> usize {
        self.feature_tags[feature]
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_protocol::{Feature, Tag};
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_follow_sorted_names() {
        let mut realm = Realm::default();
        for tag in ["zeta", "alpha"] {
            realm.tags.insert(tag.to_string(), Tag::default());
        }
        for (name, tag) in [("c", "zeta"), ("a", "alpha"), ("b", "zeta")] {
            realm
                .features
                .insert(name.to_string(), Feature::new(tag, name));
        }

        let index = FeatureIndex::build(&realm);
        assert_eq!(index.feature_count(), 3);
        assert_eq!(index.tag_count(), 2);
        assert_eq!(index.features().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(index.feature_id("b"), Some(1));
        assert_eq!(index.feature_name(2), "c");
        assert_eq!(index.tag_id("alpha"), Some(0));
        assert_eq!(index.tag_name(1), "zeta");
        assert_eq!(index.tag_of(0), 0);
        assert_eq!(index.tag_of(2), 1);
        assert_eq!(index.feature_id("missing"), None);
    }
}
