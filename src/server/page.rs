//! Gallery page - a single self-contained HTML document with the lookup
//! form, thumbnail grid and lightbox.

/// Placeholder replaced with `true`/`false` in the page script.
const REQUIRE_ROLL_PLACEHOLDER: &str = "__REQUIRE_ROLL_NUMBER__";

/// Generate the gallery page.
///
/// With `require_roll_number` the name and roll number fields are mandatory
/// (credential variant); otherwise only the level is needed.
pub fn generate_gallery_html(require_roll_number: bool) -> String {
    PAGE_TEMPLATE.replace(
        REQUIRE_ROLL_PLACEHOLDER,
        if require_roll_number { "true" } else { "false" },
    )
}

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Image Gallery</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            background: #0f0f0f;
            color: #e5e5e5;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            padding: 24px;
        }
        h1 { font-size: 20px; font-weight: 600; margin-bottom: 16px; }
        form {
            display: flex;
            flex-wrap: wrap;
            gap: 12px;
            align-items: flex-end;
            background: rgba(255, 255, 255, 0.04);
            border: 1px solid rgba(255, 255, 255, 0.08);
            border-radius: 8px;
            padding: 16px;
            margin-bottom: 24px;
        }
        label { display: flex; flex-direction: column; gap: 4px; font-size: 12px; color: #a3a3a3; }
        input, select {
            background: #1a1a1a;
            color: #e5e5e5;
            border: 1px solid #333;
            border-radius: 4px;
            padding: 8px 10px;
            font-size: 14px;
            min-width: 180px;
        }
        button {
            background: #2563eb;
            color: white;
            border: none;
            border-radius: 4px;
            padding: 9px 18px;
            font-size: 14px;
            cursor: pointer;
        }
        button:disabled { opacity: 0.5; cursor: wait; }
        #status { font-size: 14px; color: #a3a3a3; margin-bottom: 16px; min-height: 20px; }
        #status.error { color: #f87171; }
        #grid {
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(160px, 1fr));
            gap: 12px;
        }
        #grid img {
            width: 100%;
            aspect-ratio: 1;
            object-fit: cover;
            border-radius: 6px;
            cursor: zoom-in;
            background: #1a1a1a;
        }
        #lightbox {
            position: fixed;
            inset: 0;
            background: rgba(0, 0, 0, 0.92);
            display: none;
            align-items: center;
            justify-content: center;
            z-index: 10;
        }
        #lightbox.open { display: flex; }
        #lightbox img { max-width: 90vw; max-height: 90vh; border-radius: 4px; }
        .nav {
            position: absolute;
            top: 50%;
            transform: translateY(-50%);
            background: rgba(255, 255, 255, 0.1);
            font-size: 24px;
            padding: 12px 16px;
        }
        #prev { left: 16px; }
        #next { right: 16px; }
        #close { position: absolute; top: 16px; right: 16px; background: rgba(255, 255, 255, 0.1); }
        #counter { position: absolute; bottom: 16px; font-size: 13px; color: #a3a3a3; }
    </style>
</head>
<body>
    <h1>Image Gallery</h1>

    <form id="lookup">
        <label class="credential">Name
            <input id="name" name="name" autocomplete="name">
        </label>
        <label class="credential">Roll number
            <input id="rollNumber" name="rollNumber" inputmode="numeric" maxlength="10" pattern="[0-9]{10}">
        </label>
        <label>Level
            <select id="level" name="level" required>
                <option value="">Select level</option>
                <option value="UG">Undergraduate (UG)</option>
                <option value="PG">Postgraduate (PG)</option>
                <option value="PHD">Doctorate (PHD)</option>
            </select>
        </label>
        <button id="submit" type="submit">Show images</button>
    </form>

    <div id="status"></div>
    <div id="grid"></div>

    <div id="lightbox" role="dialog" aria-modal="true">
        <button id="close" type="button" aria-label="Close">&times;</button>
        <button id="prev" class="nav" type="button" aria-label="Previous">&#8249;</button>
        <img id="lightbox-image" alt="">
        <button id="next" class="nav" type="button" aria-label="Next">&#8250;</button>
        <div id="counter"></div>
    </div>

    <script>
        const REQUIRE_ROLL_NUMBER = __REQUIRE_ROLL_NUMBER__;
        const form = document.getElementById('lookup');
        const statusEl = document.getElementById('status');
        const grid = document.getElementById('grid');
        const submit = document.getElementById('submit');
        const lightbox = document.getElementById('lightbox');
        const lightboxImage = document.getElementById('lightbox-image');
        const counter = document.getElementById('counter');
        let images = [];
        let current = 0;

        if (REQUIRE_ROLL_NUMBER) {
            document.getElementById('name').required = true;
            document.getElementById('rollNumber').required = true;
        } else {
            document.querySelectorAll('.credential').forEach(el => el.style.display = 'none');
        }

        function setStatus(message, isError) {
            statusEl.textContent = message;
            statusEl.className = isError ? 'error' : '';
        }

        function render() {
            grid.replaceChildren();
            images.forEach((image, index) => {
                const img = document.createElement('img');
                img.src = image.url;
                img.loading = 'lazy';
                img.alt = 'Image ' + (index + 1);
                img.addEventListener('click', () => openLightbox(index));
                grid.appendChild(img);
            });
        }

        function openLightbox(index) {
            current = index;
            lightboxImage.src = images[current].url;
            counter.textContent = (current + 1) + ' / ' + images.length;
            lightbox.classList.add('open');
        }

        function closeLightbox() {
            lightbox.classList.remove('open');
            lightboxImage.removeAttribute('src');
        }

        function step(delta) {
            if (images.length === 0) return;
            openLightbox((current + delta + images.length) % images.length);
        }

        form.addEventListener('submit', async (event) => {
            event.preventDefault();
            const level = document.getElementById('level').value;
            const rollNumber = document.getElementById('rollNumber').value.trim();

            if (!level) {
                setStatus('Please select a level.', true);
                return;
            }
            if (REQUIRE_ROLL_NUMBER && !/^[0-9]{10}$/.test(rollNumber)) {
                setStatus('Roll number must be exactly 10 digits.', true);
                return;
            }

            const params = new URLSearchParams({ level });
            if (REQUIRE_ROLL_NUMBER) params.set('rollNumber', rollNumber);

            submit.disabled = true;
            setStatus('Loading...', false);
            images = [];
            render();

            try {
                const response = await fetch('/api/images?' + params.toString());
                const body = await response.json();
                if (!response.ok || !body.success) {
                    setStatus(body.message || 'Failed to fetch images.', true);
                    return;
                }
                images = body.images;
                render();
                setStatus(images.length === 0
                    ? 'No images found for this selection.'
                    : images.length + ' image(s) found.', false);
            } catch (err) {
                setStatus('Could not reach the server.', true);
            } finally {
                submit.disabled = false;
            }
        });

        document.getElementById('close').addEventListener('click', closeLightbox);
        document.getElementById('prev').addEventListener('click', () => step(-1));
        document.getElementById('next').addEventListener('click', () => step(1));
        lightbox.addEventListener('click', (event) => {
            if (event.target === lightbox) closeLightbox();
        });
        document.addEventListener('keydown', (event) => {
            if (!lightbox.classList.contains('open')) return;
            if (event.key === 'Escape') closeLightbox();
            if (event.key === 'ArrowLeft') step(-1);
            if (event.key === 'ArrowRight') step(1);
        });
    </script>
</body>
</html>
"##;
