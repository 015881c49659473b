//! Static service tables backing intent classification and the canned
//! instant replies.

/// Top-level service categories offered on the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DigitalMarketing,
    CreativeServices,
    PrintAdvertising,
    RadioAdvertising,
    ContentMarketing,
    WebDevelopment,
    CelebrityEndorsements,
    InfluencerMarketing,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::DigitalMarketing,
        Category::CreativeServices,
        Category::PrintAdvertising,
        Category::RadioAdvertising,
        Category::ContentMarketing,
        Category::WebDevelopment,
        Category::CelebrityEndorsements,
        Category::InfluencerMarketing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::DigitalMarketing => "Digital Marketing",
            Category::CreativeServices => "Creative Services",
            Category::PrintAdvertising => "Print Advertising",
            Category::RadioAdvertising => "Radio Advertising",
            Category::ContentMarketing => "Content Marketing",
            Category::WebDevelopment => "Web Development",
            Category::CelebrityEndorsements => "Celebrity Endorsements",
            Category::InfluencerMarketing => "Influencer Marketing",
        }
    }

    /// Detail reply listing the sub-services of this category
    pub fn detail(self) -> &'static str {
        match self {
            Category::DigitalMarketing => {
                "✨ Digital Marketing Services:\n\n\
                 1️⃣ SEO (Search Engine Optimization)\n\
                 2️⃣ PPC (Google Ads)\n\
                 3️⃣ Social Media Management & ORM\n\
                 4️⃣ Lead Generation\n\
                 5️⃣ Brand Awareness\n\n\
                 Each service is customized to your brand's goals. Want to know more about any of these?"
            }
            Category::CreativeServices => {
                "🎨 Creative Services:\n\n\
                 1️⃣ Branding & Identity Development\n\
                 2️⃣ Graphic Design\n\
                 3️⃣ Logo Design\n\
                 4️⃣ Print Advertising Design\n\
                 5️⃣ Packaging Design\n\n\
                 We bring your brand vision to life through strategic design."
            }
            Category::PrintAdvertising => {
                "📰 Print Advertising Services:\n\n\
                 1️⃣ Advertisement Design\n\
                 2️⃣ Ad Placement (Newspapers, Magazines)\n\
                 3️⃣ Copywriting\n\
                 4️⃣ Media Buying & Cost Negotiation\n\
                 5️⃣ Ad Size Optimization\n\
                 6️⃣ Campaign Scheduling\n\n\
                 We handle everything from design to placement in top publications."
            }
            Category::RadioAdvertising => {
                "📻 Radio Advertising Services:\n\n\
                 1️⃣ Advertising Concept Development\n\
                 2️⃣ Scriptwriting\n\
                 3️⃣ Voiceover Casting\n\
                 4️⃣ Recording & Production\n\
                 5️⃣ Media Planning & Buying\n\
                 6️⃣ Cost Negotiations\n\n\
                 From script to broadcast, we create radio campaigns that capture attention."
            }
            Category::ContentMarketing => {
                "📝 Content Marketing Services:\n\n\
                 1️⃣ Customized Content Strategy\n\
                 2️⃣ Email & Newsletter Marketing\n\
                 3️⃣ Asset Creation & Infographics\n\
                 4️⃣ Content Promotion & Optimization\n\n\
                 We craft content that tells your brand story and drives engagement."
            }
            Category::WebDevelopment => {
                "💻 Web Development Services:\n\n\
                 1️⃣ UI/UX Design\n\
                 2️⃣ Custom Website Design & Development\n\
                 3️⃣ E-Commerce Website Development\n\
                 4️⃣ Landing Page Development\n\
                 5️⃣ WordPress Web Design\n\n\
                 We build high-converting digital experiences, not just websites."
            }
            Category::CelebrityEndorsements => {
                "⭐ Celebrity Endorsement Services:\n\n\
                 1️⃣ Celebrity Identification & Selection\n\
                 2️⃣ Contract Negotiations\n\
                 3️⃣ Creative Collaboration\n\
                 4️⃣ Campaign Integration\n\
                 5️⃣ Public Relations Management\n\
                 6️⃣ Legal Compliance\n\n\
                 We connect your brand with the right celebrity to amplify your message."
            }
            Category::InfluencerMarketing => {
                "📱 Influencer Marketing Services:\n\n\
                 1️⃣ Influencer Identification & Vetting\n\
                 2️⃣ Cost-Benefit Analysis\n\
                 3️⃣ Contract Negotiations\n\
                 4️⃣ Creative Collaboration\n\
                 5️⃣ Campaign Integration\n\
                 6️⃣ Performance Tracking & Messaging Optimization\n\n\
                 We partner with the right influencers to reach your target audience authentically."
            }
        }
    }
}

/// Sub-service keys in match order. Earlier keys win when several match, so
/// "web development" must stay ahead of "web".
pub const SUB_SERVICES: &[(&str, Category)] = &[
    ("digital marketing", Category::DigitalMarketing),
    ("seo", Category::DigitalMarketing),
    ("ppc", Category::DigitalMarketing),
    ("google ads", Category::DigitalMarketing),
    ("social media", Category::DigitalMarketing),
    ("orm", Category::DigitalMarketing),
    ("lead generation", Category::DigitalMarketing),
    ("brand awareness", Category::DigitalMarketing),
    ("creative services", Category::CreativeServices),
    ("creative", Category::CreativeServices),
    ("branding", Category::CreativeServices),
    ("logo", Category::CreativeServices),
    ("graphic", Category::CreativeServices),
    ("packaging", Category::CreativeServices),
    ("print advertising", Category::PrintAdvertising),
    ("print", Category::PrintAdvertising),
    ("copywriting", Category::PrintAdvertising),
    ("radio advertising", Category::RadioAdvertising),
    ("radio", Category::RadioAdvertising),
    ("scriptwriting", Category::RadioAdvertising),
    ("voiceover", Category::RadioAdvertising),
    ("content marketing", Category::ContentMarketing),
    ("content", Category::ContentMarketing),
    ("email marketing", Category::ContentMarketing),
    ("newsletter", Category::ContentMarketing),
    ("infographic", Category::ContentMarketing),
    ("web development", Category::WebDevelopment),
    ("web", Category::WebDevelopment),
    ("ui/ux", Category::WebDevelopment),
    ("uiux", Category::WebDevelopment),
    ("ui ux", Category::WebDevelopment),
    ("ux", Category::WebDevelopment),
    ("wordpress", Category::WebDevelopment),
    ("ecommerce", Category::WebDevelopment),
    ("e-commerce", Category::WebDevelopment),
    ("landing page", Category::WebDevelopment),
    ("website", Category::WebDevelopment),
    ("celebrity endorsements", Category::CelebrityEndorsements),
    ("celebrity", Category::CelebrityEndorsements),
    ("endorsement", Category::CelebrityEndorsements),
    ("influencer marketing", Category::InfluencerMarketing),
    ("influencer", Category::InfluencerMarketing),
];

pub const SERVICES_LIST_PHRASES: &[&str] = &[
    "service",
    "services",
    "what do you do",
    "what do you offer",
    "what you do",
    "what you offer",
    "what can you",
    "what are your",
    "tell me about",
    "tell me more",
    "list",
    "details",
    "offerings",
    "how can you help",
    "help me with",
    "your company",
    "about ritz",
    "about you",
    "all service",
    "complete service",
    "show me",
    "available service",
];

pub const LEAD_KEYWORDS: &[&str] = &[
    "contact",
    "price",
    "pricing",
    "cost",
    "charge",
    "charges",
    "quote",
    "quotation",
    "hire",
    "project",
    "call",
    "email",
    "interested",
    "talk",
    "budget",
    "estimate",
    "how much",
    "rate",
    "fees",
    "package",
];

pub const SERVICES_LIST: &str = "Here are all the services we offer:\n\n\
    1️⃣ Digital Marketing\n\
    2️⃣ Creative Services\n\
    3️⃣ Print Advertising\n\
    4️⃣ Radio Advertising\n\
    5️⃣ Content Marketing\n\
    6️⃣ Web Development\n\
    7️⃣ Celebrity Endorsements\n\
    8️⃣ Influencer Marketing";

pub const SERVICES_LIST_FOLLOW_UP: &str = "Which service interests you the most? Just type the name \
    (like 'Digital Marketing' or 'Creative Services') and I'll share the details! 😊";

pub const PRICING_REPLY: &str = "Our pricing is fully customized based on your goals and industry. \
    Let me connect you with our team for a detailed proposal 👇";

pub const DEFAULT_WELCOME: &str = "Hello 👋 I'm Ruby.\nWelcome to Ritz Media World.\n\n\
    If you're exploring our services, campaigns, or capabilities,\nI'm here to help you 😊";

pub const DEFAULT_WELCOME_DELAY_MS: u64 = 800;

/// Look up the category of a sub-service key from [`SUB_SERVICES`].
pub fn category_of(key: &str) -> Option<Category> {
    SUB_SERVICES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, category)| *category)
}
