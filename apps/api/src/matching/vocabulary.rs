/// Closed set of lowercase terms used both for résumé keyword extraction and
/// for job-description matching. Read-only for the life of the process.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    terms: &'static [&'static str],
}

const DEFAULT_TERMS: &[&str] = &[
    // Technical skills
    "python", "javascript", "react", "node", "java", "c++", "c#", "php", "ruby", "go", "rust",
    "html", "css", "sql", "mongodb", "postgresql", "mysql", "redis", "docker", "kubernetes",
    "aws", "azure", "gcp", "cloud", "devops", "ci/cd", "git", "github", "agile", "scrum",
    // Roles and industries
    "developer", "engineer", "programmer", "coder", "architect", "analyst", "scientist",
    "manager", "lead", "senior", "junior", "full stack", "frontend", "backend", "mobile",
    "web", "software", "hardware", "system", "network", "security", "database", "data",
    "machine learning", "ai", "artificial intelligence", "nlp", "computer vision",
    "deep learning", "designer", "ui", "ux", "user interface", "user experience", "product",
    "project", "business", "marketing", "sales", "customer", "support", "operations",
    "finance", "hr", "human resources", "legal", "medical", "healthcare", "education",
    "research",
    // General work terms
    "experience", "years", "team", "collaboration", "communication", "leadership",
    "problem solving", "analysis", "planning", "organization", "management",
    "remote", "onsite", "hybrid", "full time", "part time", "contract", "freelance",
    // Education and certifications
    "degree", "bachelor", "master", "phd", "certification", "certified", "training",
    "course", "workshop", "seminar", "conference", "meetup",
];

impl Vocabulary {
    /// The process-wide vocabulary.
    pub const DEFAULT: Vocabulary = Vocabulary {
        terms: DEFAULT_TERMS,
    };

    /// Terms must already be lowercase.
    pub const fn new(terms: &'static [&'static str]) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &'static [&'static str] {
        self.terms
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(&term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::DEFAULT
    }
}
