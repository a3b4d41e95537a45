//! Built-in digest prompts
//!
//! Both prompts ask for the labeled block layout the listing parser reads:
//! one `**Label**: value` per line, blank line between listings.

/// Data science and data analyst roles in the New Jersey energy sector
pub const DATA_SCIENCE_ENERGY: &str = r#"Generate exactly 5 realistic and current job listings for Data Science and Data Analyst roles in the Energy sector in New Jersey. Format each job listing precisely as shown below, with a blank line between listings and no other text:

**Job Title**: [Job Title]
**Company**: [Company Name]
**Location**: [City, State]
**Job Description**: [Short Job Description]
**Apply Link**: [Job Link or N/A]

Ensure that the job titles, companies, and job descriptions are realistic and follow industry standards. The links should be plausible job application links; write N/A if no direct link is available."#;

/// Chemistry roles for a Master's graduate in New Jersey
pub const CHEMISTRY: &str = r#"Generate exactly 5 realistic and current job listings for Chemistry roles suitable for someone with a Master's degree in Chemistry in New Jersey. Format each job listing precisely as shown below, with a blank line between listings and no other text:

**Job Title**: [Job Title]
**Company**: [Company Name]
**Location**: [City, State]
**Job Description**: [Short Job Description]
**Apply Link**: [Job Link or N/A]

Ensure that the job titles, companies, and job descriptions are realistic and follow industry standards. The links should be plausible job application links; write N/A if no direct link is available."#;
